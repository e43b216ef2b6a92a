//! Client for the public web API
//!
//! Every request carries the static browser headers (`Accept`, `Origin`,
//! `Referer`), an `Authorization: OAuth <token>` header when a bearer token is
//! known, and the access id as the `client_id` query parameter.

mod records;

pub use records::{
    FormatRecord, LikeRecord, LikesPage, MediaRecord, PlaylistRecord, Resolved, StreamLocation,
    TrackRecord, TranscodingRecord, UserRecord,
};

use crate::config::ApiConfig;
use crate::error::{AssemblyError, Error, Result};
use crate::http::{Headers, HttpTransport};
use crate::types::{Credential, TrackDescriptor, Transcoding};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Typed access to the API endpoints the engine uses
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Create a client issuing requests through `transport`
    pub fn new(config: ApiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Headers sent with every API request
    pub fn headers(&self, credential: &Credential) -> Headers {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Origin".to_string(), self.config.origin.clone()),
            ("Referer".to_string(), self.config.referer.clone()),
        ];
        if let Some(token) = &credential.bearer_token {
            headers.push(("Authorization".to_string(), format!("OAuth {}", token)));
        }
        headers
    }

    /// Resolve a public page URL to the object it shows
    ///
    /// # Errors
    /// [`Error::AuthFailure`] on 401/403, [`Error::Http`] on other failed
    /// statuses, [`Error::Serialization`] if the body is not a known record.
    pub async fn resolve(&self, public_url: &str, credential: &Credential) -> Result<Resolved> {
        let url = self.resolve_url(public_url, credential)?;
        self.get_json(&url, credential).await
    }

    /// Resolve a public track URL straight to a descriptor
    pub async fn resolve_track(
        &self,
        public_url: &str,
        credential: &Credential,
    ) -> Result<TrackDescriptor> {
        let url = self.resolve_url(public_url, credential)?;
        let record: TrackRecord = self.get_json(&url, credential).await?;
        Ok(record.into_descriptor())
    }

    /// Full records for `ids` in one request
    ///
    /// The server caps this at [`MAX_METADATA_CHUNK_SIZE`](crate::config::MAX_METADATA_CHUNK_SIZE)
    /// ids; callers chunk. Records come back in no guaranteed order.
    pub async fn fetch_tracks(
        &self,
        ids: &[u64],
        credential: &Credential,
    ) -> Result<Vec<TrackDescriptor>> {
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = stamp(
            &format!("{}/tracks", self.config.base_url),
            &[("ids", ids.as_str()), ("client_id", credential.access_id.as_str())],
        )?;
        let records: Vec<TrackRecord> = self.get_json(&url, credential).await?;
        Ok(records.into_iter().map(TrackRecord::into_descriptor).collect())
    }

    /// First page of a user's liked tracks
    pub fn likes_url(&self, user_id: u64, page_size: usize) -> String {
        format!(
            "{}/users/{}/track_likes?limit={}&linked_partitioning=1",
            self.config.base_url, user_id, page_size
        )
    }

    /// Fetch one page of liked tracks
    ///
    /// `page_url` is either [`likes_url`](Self::likes_url) or a previous page's
    /// `next_href`; its `client_id` is replaced with the active one.
    pub async fn fetch_likes_page(
        &self,
        page_url: &str,
        credential: &Credential,
    ) -> Result<LikesPage> {
        let url = stamp(page_url, &[("client_id", credential.access_id.as_str())])?;
        self.get_json(&url, credential).await
    }

    /// Ask a transcoding's resolve URL where the stream actually lives
    ///
    /// # Errors
    /// [`AssemblyError::MissingStreamUrl`] if the answer carries no URL.
    pub async fn stream_location(
        &self,
        transcoding: &Transcoding,
        authorization: Option<&str>,
        credential: &Credential,
    ) -> Result<String> {
        let mut params = vec![("client_id", credential.access_id.as_str())];
        if let Some(token) = authorization {
            params.push(("track_authorization", token));
        }
        let url = stamp(&transcoding.resolve_url, &params)?;

        let location: StreamLocation = self.get_json(&url, credential).await?;
        location
            .url
            .filter(|u| !u.is_empty())
            .ok_or(Error::Assembly(AssemblyError::MissingStreamUrl))
    }

    fn resolve_url(&self, public_url: &str, credential: &Credential) -> Result<String> {
        stamp(
            &format!("{}/resolve", self.config.base_url),
            &[("url", public_url), ("client_id", credential.access_id.as_str())],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, credential: &Credential) -> Result<T> {
        debug!(url, "API request");
        self.transport
            .get(url, &self.headers(credential))
            .await?
            .error_for_status(url)?
            .json()
    }
}

/// Set query parameters on `url`, replacing any existing ones with the same names
fn stamp(url: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut parsed = Url::parse(url)?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(name, _)| k == name))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = parsed.query_pairs_mut();
        query.clear();
        query.extend_pairs(kept);
        query.extend_pairs(params.iter().copied());
    }
    Ok(parsed.to_string())
}
