//! Sequential batch downloads packaged into one store-only archive.

use crate::archive;
use crate::error::{Error, Result};
use crate::types::{Artifact, BatchOutcome, Event, TrackDescriptor, TrackHints};
use crate::utils::{clean_filename, percent, unique_entry_name};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{CollectionRef, Downloader, ResolvedCollection};

/// Archive name used when the collection title cleans down to nothing
const FALLBACK_ARCHIVE_STEM: &str = "soundcloud";

impl Downloader {
    /// Download every track of a playlist or likes URL and pack them into one archive
    ///
    /// Tracks are processed one at a time, in collection order, with
    /// `batch.pacing_delay` between consecutive items. Track-scoped failures are
    /// logged, reported as [`Event::TrackFailed`] and skipped; an auth failure also
    /// invalidates the client id so the next item extracts a fresh one. Cancelling `cancel`
    /// stops before the next item; whatever was downloaded so far is still
    /// archived.
    ///
    /// # Errors
    /// [`Error::NoArtifacts`] when not a single track succeeded, or the first
    /// error that is not scoped to one track (e.g. no credential).
    pub async fn run_batch(&self, url: &str, cancel: CancellationToken) -> Result<BatchOutcome> {
        let reference = CollectionRef::parse(url)?;
        self.progress("Resolving collection...", 0);

        let collection = self.resolve_collection(&reference, &cancel).await?;
        info!(
            title = %collection.title,
            tracks = collection.tracks.len(),
            "starting batch download"
        );

        self.download_all(collection, &cancel).await
    }

    /// [`run_batch`](Self::run_batch), then hand the archive to the save sink
    pub async fn download_collection(
        &self,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<(BatchOutcome, PathBuf)> {
        let outcome = self.run_batch(url, cancel).await?;
        let path = self.sink.save(&outcome.archive).await?;
        Ok((outcome, path))
    }

    pub(crate) async fn download_all(
        &self,
        collection: ResolvedCollection,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome> {
        let ResolvedCollection { title, tracks } = collection;
        let total = tracks.len();

        let mut artifacts = Vec::new();
        let mut taken = HashSet::new();
        let mut attempted = 0;
        let mut failed = 0;
        let mut cancelled = false;

        for (index, track) in tracks.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(attempted, total, "batch cancelled");
                cancelled = true;
                break;
            }

            let label = track
                .title
                .clone()
                .unwrap_or_else(|| format!("track {}", track.id));
            self.progress(
                format!("Downloading {}/{}: {}", index + 1, total, label),
                percent(index, total),
            );

            attempted += 1;
            match self.download_item(track).await {
                Ok(mut artifact) => {
                    artifact.filename = unique_entry_name(&artifact.filename, &mut taken);
                    debug!(index, file = %artifact.filename, "batch item done");
                    artifacts.push(artifact);
                }
                Err(e) if e.is_track_scoped() => {
                    warn!(index, track_id = track.id, error = %e, "skipping track");
                    failed += 1;
                    self.emit_event(Event::TrackFailed {
                        index,
                        total,
                        track_id: track.id,
                        error: e.to_string(),
                    });
                    if e.is_auth_failure() {
                        // Later items re-extract; the failed one is not retried
                        self.credentials.invalidate().await?;
                    }
                }
                Err(e) => return Err(e),
            }

            let delay = self.config.batch.pacing_delay;
            if index + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.emit_event(Event::BatchFinished {
            succeeded: artifacts.len(),
            failed,
            total,
            cancelled,
        });

        if artifacts.is_empty() {
            return Err(Error::NoArtifacts { total, cancelled });
        }

        self.progress("Packaging archive...", 100);
        let archive = Artifact {
            filename: archive_filename(&title),
            bytes: archive::build(&artifacts)?,
        };

        let outcome = BatchOutcome {
            title,
            artifacts,
            attempted,
            failed,
            total,
            cancelled,
            archive,
        };
        info!(
            archive = %outcome.archive.filename,
            bytes = outcome.archive.bytes.len(),
            "{}",
            outcome.summary()
        );
        self.progress(outcome.summary(), 100);
        Ok(outcome)
    }

    async fn download_item(&self, track: &TrackDescriptor) -> Result<Artifact> {
        let credential = self.credentials.acquire().await?;
        self.assemble_track(track, &TrackHints::default(), &credential, &mut |_, _| {})
            .await
    }
}

/// `<clean title>.zip`
fn archive_filename(title: &str) -> String {
    let stem = clean_filename(title);
    if stem.is_empty() {
        format!("{}.zip", FALLBACK_ARCHIVE_STEM)
    } else {
        format!("{}.zip", stem)
    }
}
