//! Credential store: access id discovery, caching and invalidation.
//!
//! [`CredentialStore::acquire`] tries each source in order until one yields an
//! access id:
//! 1. a value captured this session (configured `client_id` or [`CredentialStore::capture`])
//! 2. the persisted value, if younger than the configured TTL
//! 3. the page's bootstrap data
//! 4. inline `<script>` content on the page
//! 5. linked script bundles, fetched one at a time
//!
//! Every extraction from sources 3-5 overwrites the persisted value and timestamp.

mod page;
mod persistence;

pub use page::{PageSnapshot, scan_bundle};
pub use persistence::{CredentialPersistence, MemoryPersistence};

use crate::config::CredentialConfig;
use crate::error::{Error, Result};
use crate::http::HttpTransport;
use crate::types::Credential;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Persistence key holding the access id
pub const ACCESS_ID_KEY: &str = "credential.access_id";
/// Persistence key holding the extraction time (Unix milliseconds)
pub const OBTAINED_AT_KEY: &str = "credential.obtained_at";

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Holds the active credential and knows how to find a new one
pub struct CredentialStore {
    config: CredentialConfig,
    transport: Arc<dyn HttpTransport>,
    persistence: Arc<dyn CredentialPersistence>,
    clock: Arc<dyn Clock>,
    captured: Mutex<Option<Credential>>,
    page: Mutex<Option<Arc<PageSnapshot>>>,
}

impl CredentialStore {
    /// Create a store; a configured `client_id` counts as already captured
    pub fn new(
        config: CredentialConfig,
        transport: Arc<dyn HttpTransport>,
        persistence: Arc<dyn CredentialPersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let captured = config
            .client_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| Credential {
                access_id: id.clone(),
                bearer_token: config.oauth_token.clone(),
                obtained_at: clock.now(),
            });

        Self {
            config,
            transport,
            persistence,
            clock,
            captured: Mutex::new(captured),
            page: Mutex::new(None),
        }
    }

    /// Return a usable credential, extracting a new one if needed
    ///
    /// Fails with [`Error::NoCredential`] when no source yields an access id; the
    /// caller should ask the user to act (e.g. play a track) rather than retry.
    pub async fn acquire(&self) -> Result<Credential> {
        let mut captured = self.captured.lock().await;
        if let Some(credential) = captured.as_ref() {
            return Ok(credential.clone());
        }

        if let Some(credential) = self.load_persisted().await? {
            debug!("using cached client id");
            *captured = Some(credential.clone());
            return Ok(credential);
        }

        let page = self.page_snapshot().await;
        let found = match page.bootstrap_access_id() {
            Some(id) => Some((id, "bootstrap data")),
            None => match page.inline_access_id() {
                Some(id) => Some((id, "inline script")),
                None => self
                    .scan_bundles(&page)
                    .await
                    .map(|id| (id, "script bundle")),
            },
        };

        let Some((access_id, source)) = found else {
            warn!("no client id found in page data or script bundles");
            return Err(Error::NoCredential);
        };

        let credential = Credential {
            access_id,
            bearer_token: self.bearer_token(Some(&page)),
            obtained_at: self.clock.now(),
        };
        self.persist(&credential).await?;
        info!(source, "extracted client id");

        *captured = Some(credential.clone());
        Ok(credential)
    }

    /// Adopt an access id seen elsewhere (e.g. in live API traffic) and persist it
    pub async fn capture(&self, access_id: &str) -> Result<Credential> {
        let page = self.page.lock().await.clone();
        let credential = Credential {
            access_id: access_id.to_string(),
            bearer_token: self.bearer_token(page.as_deref()),
            obtained_at: self.clock.now(),
        };
        self.persist(&credential).await?;
        *self.captured.lock().await = Some(credential.clone());
        Ok(credential)
    }

    /// Forget the current credential after the server rejected it
    ///
    /// Clears the in-memory value and zeroes the persisted timestamp so the next
    /// [`acquire`](Self::acquire) goes straight to page extraction.
    pub async fn invalidate(&self) -> Result<()> {
        *self.captured.lock().await = None;
        *self.page.lock().await = None;
        self.persistence.set(ACCESS_ID_KEY, "").await?;
        self.persistence.set(OBTAINED_AT_KEY, "0").await?;
        info!("client id invalidated");
        Ok(())
    }

    async fn load_persisted(&self) -> Result<Option<Credential>> {
        let Some(access_id) = self.persistence.get(ACCESS_ID_KEY).await? else {
            return Ok(None);
        };
        if access_id.is_empty() {
            return Ok(None);
        }
        let obtained_ms = self
            .persistence
            .get(OBTAINED_AT_KEY)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        let age_ms = self.clock.now().timestamp_millis() - obtained_ms;
        if obtained_ms <= 0 || age_ms < 0 || age_ms as u128 >= self.config.ttl.as_millis() {
            debug!(age_ms, "cached client id is stale");
            return Ok(None);
        }

        let Some(obtained_at) = DateTime::from_timestamp_millis(obtained_ms) else {
            return Ok(None);
        };
        Ok(Some(Credential {
            access_id,
            bearer_token: self.bearer_token(None),
            obtained_at,
        }))
    }

    async fn persist(&self, credential: &Credential) -> Result<()> {
        self.persistence
            .set(ACCESS_ID_KEY, &credential.access_id)
            .await?;
        self.persistence
            .set(
                OBTAINED_AT_KEY,
                &credential.obtained_at.timestamp_millis().to_string(),
            )
            .await
    }

    fn bearer_token(&self, page: Option<&PageSnapshot>) -> Option<String> {
        self.config
            .oauth_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| page.and_then(PageSnapshot::oauth_token))
    }

    /// Fetch the page once per credential lifetime; an unreachable page has no data
    async fn page_snapshot(&self) -> Arc<PageSnapshot> {
        let mut page = self.page.lock().await;
        if let Some(snapshot) = page.as_ref() {
            return Arc::clone(snapshot);
        }

        let url = &self.config.page_url;
        let snapshot = match self.transport.get(url, &[]).await {
            Ok(resp) if resp.is_success() => PageSnapshot::parse(&resp.text(), url),
            Ok(resp) => {
                warn!(url = %url, status = resp.status, "could not load page for client id discovery");
                PageSnapshot::default()
            }
            Err(e) => {
                warn!(url = %url, error = %e, "could not load page for client id discovery");
                PageSnapshot::default()
            }
        };

        let snapshot = Arc::new(snapshot);
        *page = Some(Arc::clone(&snapshot));
        snapshot
    }

    async fn scan_bundles(&self, page: &PageSnapshot) -> Option<String> {
        for url in page.bundle_urls(&self.config.bundle_host) {
            match self.transport.get(url, &[]).await {
                Ok(resp) if resp.is_success() => {
                    if let Some(id) = scan_bundle(&resp.text()) {
                        debug!(url, "client id found in script bundle");
                        return Some(id);
                    }
                }
                Ok(resp) => debug!(url, status = resp.status, "script bundle unavailable"),
                Err(e) => debug!(url, error = %e, "script bundle fetch failed"),
            }
        }
        None
    }
}
