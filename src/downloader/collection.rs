//! Collection resolution: playlists, liked-track listings, pagination and backfill.

use crate::api::Resolved;
use crate::config::MAX_METADATA_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::types::TrackDescriptor;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::Downloader;

/// What a collection URL points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionRef {
    /// A playlist, album or set page
    Playlist {
        /// Public page URL
        url: String,
    },
    /// The liked tracks of the user whose profile is at `profile_url`
    Likes {
        /// Public profile URL (the likes URL without its `/likes` suffix)
        profile_url: String,
    },
}

impl CollectionRef {
    /// Classify a public URL; a path ending in `/likes` is a liked-tracks listing
    pub fn parse(url: &str) -> Result<Self> {
        let mut parsed = Url::parse(url)?;
        let path = parsed.path().trim_end_matches('/').to_string();

        match path.strip_suffix("/likes") {
            Some("") => Err(Error::UnsupportedUrl(url.to_string())),
            Some(profile) => {
                parsed.set_path(profile);
                parsed.set_query(None);
                parsed.set_fragment(None);
                Ok(Self::Likes {
                    profile_url: parsed.to_string(),
                })
            }
            None => Ok(Self::Playlist {
                url: url.to_string(),
            }),
        }
    }
}

/// Ordered tracks of a collection, plus the name its archive is given
#[derive(Clone, Debug)]
pub struct ResolvedCollection {
    /// Collection title
    pub title: String,
    /// Tracks in collection order
    pub tracks: Vec<TrackDescriptor>,
}

impl Downloader {
    /// Resolve a collection to its ordered tracks, with full metadata where possible
    ///
    /// Liked-track listings are paged through until the server reports no next
    /// page or `cancel` fires. Partial records are then backfilled in chunks of
    /// at most `batch.metadata_chunk_size` ids.
    pub async fn resolve_collection(
        &self,
        reference: &CollectionRef,
        cancel: &CancellationToken,
    ) -> Result<ResolvedCollection> {
        let mut collection = match reference {
            CollectionRef::Playlist { url } => self.resolve_playlist(url).await?,
            CollectionRef::Likes { profile_url } => self.resolve_likes(profile_url, cancel).await?,
        };

        self.backfill(&mut collection.tracks).await;
        Ok(collection)
    }

    async fn resolve_playlist(&self, url: &str) -> Result<ResolvedCollection> {
        let resolved = self
            .with_auth_retry(|credential| async move { self.api.resolve(url, &credential).await })
            .await?;

        match resolved {
            Resolved::Playlist(playlist) => {
                let tracks: Vec<TrackDescriptor> = playlist
                    .tracks
                    .into_iter()
                    .map(|record| record.into_descriptor())
                    .collect();
                info!(playlist_id = playlist.id, tracks = tracks.len(), "resolved playlist");
                Ok(ResolvedCollection {
                    title: playlist
                        .title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| format!("playlist-{}", playlist.id)),
                    tracks,
                })
            }
            other => {
                debug!(?other, "URL does not resolve to a playlist");
                Err(Error::UnsupportedUrl(url.to_string()))
            }
        }
    }

    async fn resolve_likes(
        &self,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ResolvedCollection> {
        let resolved = self
            .with_auth_retry(|credential| async move {
                self.api.resolve(profile_url, &credential).await
            })
            .await?;

        let Resolved::User(user) = resolved else {
            return Err(Error::UnsupportedUrl(profile_url.to_string()));
        };

        let tracks = self.fetch_likes(user.id, cancel).await?;
        let name = user.username.unwrap_or_else(|| format!("user-{}", user.id));
        Ok(ResolvedCollection {
            title: format!("{} likes", name),
            tracks,
        })
    }

    /// Follow `next_href` links until the last page or cancellation
    pub(crate) async fn fetch_likes(
        &self,
        user_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<TrackDescriptor>> {
        let mut tracks = Vec::new();
        let mut next = Some(self.api.likes_url(user_id, self.config.batch.page_size));
        let mut pages = 0usize;

        while let Some(page_url) = next {
            if cancel.is_cancelled() {
                info!(pages, tracks = tracks.len(), "likes pagination cancelled");
                break;
            }

            let credential = self.credentials.acquire().await?;
            let page = self.api.fetch_likes_page(&page_url, &credential).await?;
            pages += 1;

            tracks.extend(
                page.collection
                    .into_iter()
                    .filter_map(|like| like.track)
                    .map(|record| record.into_descriptor()),
            );
            debug!(page = pages, total = tracks.len(), "fetched likes page");

            next = page.next_href.filter(|href| !href.is_empty());
        }

        Ok(tracks)
    }

    /// Replace partial records with full ones, matched by id
    ///
    /// A failed chunk is logged and its stubs are left in place; they fail
    /// later as unsupported and are skipped like any other bad track.
    pub(crate) async fn backfill(&self, tracks: &mut [TrackDescriptor]) {
        let partial: Vec<u64> = tracks
            .iter()
            .filter(|t| t.is_partial())
            .map(|t| t.id)
            .collect();
        if partial.is_empty() {
            return;
        }
        info!(partial = partial.len(), "fetching full track metadata");

        let chunk_size = self
            .config
            .batch
            .metadata_chunk_size
            .clamp(1, MAX_METADATA_CHUNK_SIZE);
        let mut full: HashMap<u64, TrackDescriptor> = HashMap::with_capacity(partial.len());

        for chunk in partial.chunks(chunk_size) {
            let result = async {
                let credential = self.credentials.acquire().await?;
                self.api.fetch_tracks(chunk, &credential).await
            }
            .await;

            match result {
                Ok(records) => full.extend(records.into_iter().map(|t| (t.id, t))),
                Err(e) => warn!(error = %e, ids = chunk.len(), "metadata backfill failed"),
            }
        }

        for track in tracks.iter_mut().filter(|t| t.is_partial()) {
            if let Some(record) = full.remove(&track.id) {
                *track = record;
            }
        }
    }
}
