//! Configuration types for soundcloud-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Server-imposed ceiling on ids per metadata request
pub const MAX_METADATA_CHUNK_SIZE: usize = 50;

/// API endpoint and static request header configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL (default: "https://api-v2.soundcloud.com")
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Value of the `Origin` header sent with API calls
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Value of the `Referer` header sent with API calls
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            origin: default_origin(),
            referer: default_referer(),
        }
    }
}

/// Credential discovery and caching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// How long a persisted access id is trusted without revalidation (default: 1 hour)
    #[serde(default = "default_credential_ttl", with = "duration_serde")]
    pub ttl: Duration,

    /// Access id captured outside the library (browser traffic, command line)
    ///
    /// When set it takes the place of the live-traffic tier and wins over every
    /// other source until invalidated.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Bearer token sent as `Authorization: OAuth <token>`
    #[serde(default)]
    pub oauth_token: Option<String>,

    /// Page fetched for bootstrap data and script scanning
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Only `<script src>` bundles whose URL contains this host are scanned
    #[serde(default = "default_bundle_host")]
    pub bundle_host: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            ttl: default_credential_ttl(),
            client_id: None,
            oauth_token: None,
            page_url: default_page_url(),
            bundle_host: default_bundle_host(),
        }
    }
}

/// Batch (playlist / likes) download behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between consecutive tracks to stay under server rate limits (default: 1500ms)
    #[serde(default = "default_pacing_delay", with = "duration_ms_serde")]
    pub pacing_delay: Duration,

    /// Ids per full-record metadata request (default: 50, maximum: 50)
    #[serde(default = "default_metadata_chunk_size")]
    pub metadata_chunk_size: usize,

    /// Items requested per liked-tracks page (default: 200)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pacing_delay: default_pacing_delay(),
            metadata_chunk_size: default_metadata_chunk_size(),
            page_size: default_page_size(),
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Where finished files go
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// File collision handling
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path holding the cached credential (default: "./soundcloud-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration for [`Downloader`](crate::Downloader)
///
/// Every field has a default, so `Config::default()` works out of the box and a
/// partial JSON/TOML document only needs the settings it changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint and headers
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential discovery and caching
    #[serde(default)]
    pub credentials: CredentialConfig,

    /// Batch download behavior
    #[serde(default)]
    pub batch: BatchConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Output directory and collision policy
    #[serde(default)]
    pub output: OutputConfig,

    /// Data storage
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.batch.metadata_chunk_size == 0
            || self.batch.metadata_chunk_size > MAX_METADATA_CHUNK_SIZE
        {
            return Err(Error::Config {
                message: format!(
                    "metadata_chunk_size must be between 1 and {}, got {}",
                    MAX_METADATA_CHUNK_SIZE, self.batch.metadata_chunk_size
                ),
                key: Some("batch.metadata_chunk_size".to_string()),
            });
        }
        if self.batch.page_size == 0 {
            return Err(Error::Config {
                message: "page_size must be greater than 0".to_string(),
                key: Some("batch.page_size".to_string()),
            });
        }
        if self.credentials.ttl.is_zero() {
            return Err(Error::Config {
                message: "credential ttl must be greater than 0".to_string(),
                key: Some("credentials.ttl".to_string()),
            });
        }
        url::Url::parse(&self.api.base_url).map_err(|e| Error::Config {
            message: format!("invalid API base URL '{}': {}", self.api.base_url, e),
            key: Some("api.base_url".to_string()),
        })?;
        Ok(())
    }
}

/// File collision handling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Skip file, keep existing
    Skip,
}

fn default_api_base_url() -> String {
    "https://api-v2.soundcloud.com".to_string()
}

fn default_origin() -> String {
    "https://soundcloud.com".to_string()
}

fn default_referer() -> String {
    "https://soundcloud.com/".to_string()
}

fn default_credential_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_page_url() -> String {
    "https://soundcloud.com/".to_string()
}

fn default_bundle_host() -> String {
    "sndcdn.com".to_string()
}

fn default_pacing_delay() -> Duration {
    Duration::from_millis(1500)
}

fn default_metadata_chunk_size() -> usize {
    MAX_METADATA_CHUNK_SIZE
}

fn default_page_size() -> usize {
    200
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("soundcloud-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./soundcloud-dl.db")
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
