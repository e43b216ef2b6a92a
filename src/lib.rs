//! # soundcloud-dl
//!
//! Backend library that turns public SoundCloud track, playlist and likes URLs
//! into audio files and store-only ZIP archives.
//!
//! ## Design Philosophy
//!
//! soundcloud-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Event-driven** - Consumers subscribe to progress events, no polling required
//! - **Pluggable** - Transport, credential persistence and the save destination are traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use soundcloud_dl::{Config, Downloader, TrackHints};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // One track
//!     let path = downloader
//!         .download_track("https://soundcloud.com/artist/track", &TrackHints::default())
//!         .await?;
//!     println!("saved {}", path.display());
//!
//!     // A whole playlist, packed into one archive
//!     let cancel = CancellationToken::new();
//!     let (outcome, archive) = downloader
//!         .download_collection("https://soundcloud.com/artist/sets/mix", cancel)
//!         .await?;
//!     println!("{} -> {}", outcome.summary(), archive.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Public web API client and wire records
pub mod api;
/// Store-only ZIP archive builder
pub mod archive;
/// Configuration types
pub mod config;
/// Access id discovery, caching and invalidation
pub mod credentials;
/// Database persistence layer
pub mod db;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Transcoding selection
pub mod format;
/// HTTP transport
pub mod http;
/// HLS playlist parsing and stream assembly
pub mod stream;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, FileCollisionAction};
pub use credentials::{CredentialPersistence, CredentialStore};
pub use db::Database;
pub use downloader::{CollectionRef, DirectorySink, Downloader, SaveSink};
pub use error::{AssemblyError, DatabaseError, Error, Result};
pub use http::{HttpResponse, HttpTransport};
pub use types::{
    Artifact, BatchOutcome, Credential, Event, Protocol, StreamManifest, TrackDescriptor,
    TrackHints, Transcoding,
};

use tokio_util::sync::CancellationToken;

/// Cancel `token` once the process receives a termination signal.
///
/// Meant for batch runs: spawn it next to [`Downloader::run_batch`] so Ctrl+C
/// stops the batch after the current track and still yields an archive of what
/// finished.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use soundcloud_dl::{Config, Downloader, cancel_on_shutdown_signal};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = Downloader::new(Config::default()).await?;
///
///     let cancel = CancellationToken::new();
///     tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));
///
///     let outcome = downloader
///         .run_batch("https://soundcloud.com/someone/likes", cancel)
///         .await?;
///     println!("{}", outcome.summary());
///     Ok(())
/// }
/// ```
pub async fn cancel_on_shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = wait_for_signal() => {
            tracing::info!("cancelling running batch");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
