//! Stream assembly: turn a transcoding into one contiguous byte buffer
//!
//! Progressive transcodings are one file. Adaptive ones are an HLS playlist
//! (possibly behind a master playlist) whose segments are fetched one after
//! another and concatenated in playlist order.

pub mod manifest;

use crate::api::ApiClient;
use crate::error::{AssemblyError, Result};
use crate::http::HttpTransport;
use crate::types::{Credential, Protocol, StreamManifest, Transcoding};
use std::sync::Arc;
use tracing::{debug, info};

/// Called with `(completed, total)` after each fetched unit
pub type ProgressFn<'a> = &'a mut (dyn FnMut(usize, usize) + Send);

/// Fetches and concatenates the bytes behind a transcoding
pub struct StreamAssembler {
    api: Arc<ApiClient>,
    transport: Arc<dyn HttpTransport>,
}

impl StreamAssembler {
    /// Create an assembler; `api` performs the authenticated resolve call,
    /// `transport` fetches playlists and media
    pub fn new(api: Arc<ApiClient>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { api, transport }
    }

    /// Download everything `transcoding` points to
    ///
    /// `authorization` is the track's authorization token, sent with the
    /// resolve call when present. Segments are fetched strictly in order and
    /// `progress` is told `(i + 1, n)` after each one.
    ///
    /// # Errors
    /// - [`AssemblyError::MissingStreamUrl`] if the resolve call names no URL
    /// - [`AssemblyError::MissingMediaPlaylist`] if a master playlist has no variant
    /// - [`AssemblyError::EmptyPlaylist`] if the media playlist lists no segments
    /// - any transport or status error from the individual fetches
    pub async fn assemble(
        &self,
        transcoding: &Transcoding,
        authorization: Option<&str>,
        credential: &Credential,
        progress: ProgressFn<'_>,
    ) -> Result<Vec<u8>> {
        let location = self
            .api
            .stream_location(transcoding, authorization, credential)
            .await?;

        match transcoding.protocol {
            Protocol::Adaptive => {
                let manifest = self.load_manifest(&location).await?;
                self.fetch_segments(&manifest, progress).await
            }
            _ => {
                debug!(url = %location, "fetching progressive stream");
                let bytes = self.fetch(&location).await?;
                progress(1, 1);
                Ok(bytes)
            }
        }
    }

    /// Fetch the playlist at `url`, following a master playlist to its first variant
    pub async fn load_manifest(&self, url: &str) -> Result<StreamManifest> {
        let text = self.fetch_text(url).await?;

        let (text, media_url) = if manifest::is_master(&text) {
            let variant = manifest::first_variant(&text, manifest::base_path(url)).ok_or_else(
                || AssemblyError::MissingMediaPlaylist {
                    manifest_url: url.to_string(),
                },
            )?;
            debug!(master = url, media = %variant, "following first variant");
            (self.fetch_text(&variant).await?, variant)
        } else {
            (text, url.to_string())
        };

        let manifest = manifest::parse_media(&text, &media_url);
        if manifest.segment_urls.is_empty() {
            return Err(AssemblyError::EmptyPlaylist {
                manifest_url: media_url,
            }
            .into());
        }
        Ok(manifest)
    }

    async fn fetch_segments(
        &self,
        manifest: &StreamManifest,
        progress: ProgressFn<'_>,
    ) -> Result<Vec<u8>> {
        let urls = manifest.fetch_order();
        let total = urls.len();
        info!(segments = total, "downloading HLS stream");

        let mut data = Vec::new();
        for (index, url) in urls.into_iter().enumerate() {
            let chunk = self.fetch(url).await?;
            data.extend_from_slice(&chunk);
            progress(index + 1, total);
        }
        Ok(data)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.transport.get(url, &[]).await?.error_for_status(url)?.body)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        Ok(self
            .transport
            .get(url, &[])
            .await?
            .error_for_status(url)?
            .text())
    }
}
