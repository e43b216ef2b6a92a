//! Core downloader implementation split into focused submodules.
//!
//! The `Downloader` struct and its methods are organized by domain:
//! - [`single`] - Single-track resolution and download
//! - [`collection`] - Playlist/likes resolution, pagination and metadata backfill
//! - [`batch`] - Sequential batch downloads packaged into one archive
//! - [`sink`] - Where finished files are written

mod batch;
mod collection;
mod single;
mod sink;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use collection::{CollectionRef, ResolvedCollection};
pub use single::track_filename;
pub use sink::{DirectorySink, SaveSink};

use crate::api::ApiClient;
use crate::config::Config;
use crate::credentials::{CredentialPersistence, CredentialStore, SystemClock};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::stream::StreamAssembler;
use crate::types::{Credential, Event};
use std::future::Future;
use std::sync::Arc;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Downloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// API endpoints
    pub(crate) api: Arc<ApiClient>,
    /// Transcoding to bytes
    pub(crate) assembler: Arc<StreamAssembler>,
    /// Active access id and bearer token
    pub(crate) credentials: Arc<CredentialStore>,
    /// Destination for finished files and archives
    pub(crate) sink: Arc<dyn SaveSink>,
}

impl Downloader {
    /// Create a new Downloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the download directory
    /// - Opens/creates the SQLite database holding the cached access id
    /// - Builds the HTTP client
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.output.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.output.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let db = Database::new(&config.persistence.database_path).await?;
        let transport = ReqwestTransport::new(&config.http)?;
        let sink = DirectorySink::new(
            config.output.download_dir.clone(),
            config.output.file_collision,
        );

        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(db),
            Arc::new(sink),
        ))
    }

    /// Assemble a downloader from explicit collaborators
    ///
    /// Useful for embedding (custom transport or storage) and for tests.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        persistence: Arc<dyn CredentialPersistence>,
        sink: Arc<dyn SaveSink>,
    ) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let api = Arc::new(ApiClient::new(config.api.clone(), Arc::clone(&transport)));
        let assembler = Arc::new(StreamAssembler::new(Arc::clone(&api), Arc::clone(&transport)));
        let credentials = Arc::new(CredentialStore::new(
            config.credentials.clone(),
            transport,
            persistence,
            Arc::new(SystemClock),
        ));

        Self {
            event_tx,
            config: Arc::new(config),
            api,
            assembler,
            credentials,
            sink,
        }
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use soundcloud_dl::{Config, Downloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = Downloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{:?}", event);
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Credential store shared by every request this downloader makes
    ///
    /// Embedders that observe live API traffic can hand access ids to
    /// [`CredentialStore::capture`].
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn progress(&self, message: impl Into<String>, percent: u8) {
        self.emit_event(Event::Progress {
            message: message.into(),
            percent,
        });
    }

    /// Run `op` with the current credential, retrying once after an auth failure
    ///
    /// On 401/403 the credential is invalidated and re-acquired, and `op` runs a
    /// second time. A second auth failure is returned as is.
    pub(crate) async fn with_auth_retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Credential) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credential = self.credentials.acquire().await?;
        match op(credential).await {
            Err(e) if e.is_auth_failure() => {
                tracing::warn!(error = %e, "request rejected, refreshing client id and retrying once");
                self.credentials.invalidate().await?;
                let credential = self.credentials.acquire().await?;
                op(credential).await
            }
            other => other,
        }
    }
}
