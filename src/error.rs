//! Error types for soundcloud-dl
//!
//! This module provides error handling for the library, including:
//! - The resolution taxonomy (credentials, auth, format selection, stream assembly)
//! - Transport failures (HTTP status and network errors)
//! - Ambient failures (configuration, persistence, I/O)
//! - Machine-readable error codes for progress reporting

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for soundcloud-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for soundcloud-dl
///
/// This is the primary error type used throughout the library. Track-scoped variants
/// ([`Error::is_track_scoped`]) are downgraded to a skip by the batch orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch.page_size")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// No access id could be found by any extraction strategy
    #[error(
        "could not find a client id; play any track in the browser first so the page makes an API request, then try again"
    )]
    NoCredential,

    /// The API rejected the credential (HTTP 401/403)
    #[error("authentication failed (HTTP {status})")]
    AuthFailure {
        /// The HTTP status returned by the server
        status: u16,
    },

    /// Request completed with a non-success HTTP status
    #[error("HTTP error {status} for {url}")]
    Http {
        /// The HTTP status returned by the server
        status: u16,
        /// The requested URL
        url: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// None of the track's transcodings matches a supported format
    #[error("no supported stream format found for track {track_id}")]
    NoSupportedFormat {
        /// The track whose transcodings were rejected
        track_id: u64,
    },

    /// Stream resolution or manifest problem
    #[error("stream assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    /// A batch finished without a single downloadable track
    #[error("no tracks could be downloaded (0/{total}{})", cancelled_suffix(.cancelled))]
    NoArtifacts {
        /// Number of tracks in the collection
        total: usize,
        /// Whether the batch was cancelled
        cancelled: bool,
    },

    /// Archive container limits exceeded
    #[error("archive error: {0}")]
    Archive(String),

    /// URL could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// URL does not reference something this library can download
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// File collision at the save destination
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision (e.g., "file already exists")
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Adaptive/progressive stream assembly errors
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The authenticated resolve call returned no URL
    #[error("no stream URL returned")]
    MissingStreamUrl,

    /// A master playlist had no usable variant reference
    #[error("could not find media playlist in master playlist {manifest_url}")]
    MissingMediaPlaylist {
        /// The master playlist URL
        manifest_url: String,
    },

    /// The media playlist listed no segments
    #[error("no media segments found in playlist {manifest_url}")]
    EmptyPlaylist {
        /// The media playlist URL
        manifest_url: String,
    },
}

fn cancelled_suffix(cancelled: &bool) -> &'static str {
    if *cancelled { ", cancelled" } else { "" }
}

impl Error {
    /// True for 401/403 responses, the one failure that earns a credential refresh
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::AuthFailure { .. })
    }

    /// True if the error only concerns the track being processed
    ///
    /// Batch runs log these, count the item as failed and move on.
    pub fn is_track_scoped(&self) -> bool {
        matches!(
            self,
            Error::NoSupportedFormat { .. }
                | Error::Assembly(_)
                | Error::Http { .. }
                | Error::Network(_)
                | Error::AuthFailure { .. }
                | Error::Serialization(_)
                | Error::Url(_)
        )
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::NoCredential => "no_credential",
            Error::AuthFailure { .. } => "auth_failure",
            Error::Http { .. } | Error::Network(_) => "transport_error",
            Error::NoSupportedFormat { .. } => "no_supported_format",
            Error::Assembly(e) => match e {
                AssemblyError::MissingStreamUrl => "missing_stream_url",
                AssemblyError::MissingMediaPlaylist { .. } => "missing_media_playlist",
                AssemblyError::EmptyPlaylist { .. } => "empty_playlist",
            },
            Error::NoArtifacts { .. } => "no_artifacts",
            Error::Archive(_) => "archive_error",
            Error::Url(_) | Error::UnsupportedUrl(_) => "invalid_url",
            Error::FileCollision { .. } => "file_collision",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
