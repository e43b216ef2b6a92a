//! Single-track path: resolve, select, assemble, save.

use crate::error::Result;
use crate::format;
use crate::stream::ProgressFn;
use crate::types::{Artifact, Credential, Protocol, TrackDescriptor, TrackHints, Transcoding};
use crate::utils::{clean_filename, percent};
use std::path::PathBuf;
use tracing::{error, info};

use super::Downloader;

impl Downloader {
    /// Resolve one public track URL and return its audio
    ///
    /// `hints` fill in title/artist for the file name when the track record
    /// lacks them. A 401/403 on the initial resolve invalidates the access id
    /// and retries once; nothing else is retried.
    ///
    /// # Errors
    /// The first fatal error: [`NoCredential`](crate::Error::NoCredential),
    /// [`AuthFailure`](crate::Error::AuthFailure) (second time),
    /// [`NoSupportedFormat`](crate::Error::NoSupportedFormat),
    /// [`Assembly`](crate::Error::Assembly) or a transport error.
    pub async fn fetch_track(&self, url: &str, hints: &TrackHints) -> Result<Artifact> {
        self.progress("Resolving track...", 0);

        let result = self.resolve_and_assemble(url, hints).await;
        match &result {
            Ok(artifact) => {
                info!(url, file = %artifact.filename, bytes = artifact.bytes.len(), "track downloaded");
                self.progress("Download complete!", 100);
            }
            Err(e) => error!(url, error = %e, "track download failed"),
        }
        result
    }

    /// [`fetch_track`](Self::fetch_track), then hand the file to the save sink
    pub async fn download_track(&self, url: &str, hints: &TrackHints) -> Result<PathBuf> {
        let artifact = self.fetch_track(url, hints).await?;
        self.sink.save(&artifact).await
    }

    async fn resolve_and_assemble(&self, url: &str, hints: &TrackHints) -> Result<Artifact> {
        let track = self
            .with_auth_retry(|credential| async move {
                self.api.resolve_track(url, &credential).await
            })
            .await?;
        let credential = self.credentials.acquire().await?;

        self.assemble_track(&track, hints, &credential, &mut |done, total| {
            self.progress(
                format!("Downloading... ({}/{})", done, total),
                percent(done, total),
            )
        })
        .await
    }

    /// Select a transcoding for `track` and assemble its bytes
    pub(crate) async fn assemble_track(
        &self,
        track: &TrackDescriptor,
        hints: &TrackHints,
        credential: &Credential,
        progress: ProgressFn<'_>,
    ) -> Result<Artifact> {
        let transcoding = format::select_for(track)?;
        tracing::debug!(
            track_id = track.id,
            protocol = ?transcoding.protocol,
            mime_type = %transcoding.mime_type,
            preset = ?transcoding.preset,
            "selected transcoding"
        );
        if transcoding.protocol == Protocol::Adaptive {
            self.progress("Fetching playlist...", 0);
        }

        let bytes = self
            .assembler
            .assemble(
                transcoding,
                track.authorization_token.as_deref(),
                credential,
                progress,
            )
            .await?;

        Ok(Artifact {
            filename: track_filename(track, hints, transcoding),
            bytes,
        })
    }
}

/// File name for a downloaded track: `artist - title`, cleaned, plus extension
///
/// Record fields win over `hints`. Falls back to `track-<id>` when nothing
/// usable remains after cleaning.
pub fn track_filename(track: &TrackDescriptor, hints: &TrackHints, transcoding: &Transcoding) -> String {
    let title = track.title.as_deref().or(hints.title.as_deref());
    let artist = track.artist_name.as_deref().or(hints.artist_name.as_deref());

    let base = match (artist, title) {
        (Some(artist), Some(title)) => format!("{} - {}", artist, title),
        (None, Some(title)) => title.to_string(),
        _ => String::new(),
    };

    let mut stem = clean_filename(&base);
    if stem.is_empty() {
        stem = format!("track-{}", track.id);
    }
    format!("{}.{}", stem, transcoding.file_extension())
}
