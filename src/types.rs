//! Core types and events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access id (`client_id`) plus optional bearer token used for API calls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    /// Public API access id
    pub access_id: String,
    /// OAuth bearer token of the signed-in user, if known
    pub bearer_token: Option<String>,
    /// When the access id was extracted
    pub obtained_at: DateTime<Utc>,
}

/// Stream delivery protocol of a transcoding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// One file served whole from one URL
    #[serde(rename = "progressive")]
    Progressive,
    /// Segmented HLS stream described by a playlist
    #[serde(rename = "hls")]
    Adaptive,
    /// Anything else the server may add (e.g. encrypted variants)
    #[serde(other)]
    Unknown,
}

/// One server-side encoded variant of a track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcoding {
    /// Delivery protocol
    pub protocol: Protocol,
    /// MIME type, possibly with codec parameters (`audio/mp4; codecs="mp4a.40.2"`)
    pub mime_type: String,
    /// Encoder preset name (e.g. `aac_160k`)
    pub preset: Option<String>,
    /// Quality tier (e.g. `sq`, `hq`)
    pub quality: Option<String>,
    /// Authenticated endpoint returning the actual stream URL
    pub resolve_url: String,
}

impl Transcoding {
    /// `audio/mpeg`, with or without parameters
    pub fn is_mpeg_audio(&self) -> bool {
        self.mime_type.starts_with("audio/mpeg")
    }

    /// MPEG-4 container (AAC)
    pub fn is_mp4_audio(&self) -> bool {
        self.mime_type.contains("mp4")
    }

    /// File extension (without dot) for the assembled bytes
    pub fn file_extension(&self) -> &'static str {
        if self.is_mp4_audio() { "m4a" } else { "mp3" }
    }
}

/// Track metadata needed to download it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Track id
    pub id: u64,
    /// Track title
    pub title: Option<String>,
    /// Uploader name
    pub artist_name: Option<String>,
    /// Available encodings, in server order
    pub transcodings: Vec<Transcoding>,
    /// Per-track authorization appended to resolve calls
    pub authorization_token: Option<String>,
}

impl TrackDescriptor {
    /// A stub without transcodings; large collections abbreviate most entries this way
    pub fn is_partial(&self) -> bool {
        self.transcodings.is_empty()
    }
}

/// Best-effort title/artist taken from wherever the user found the track
///
/// Only used to name the file when the track record itself lacks the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackHints {
    /// Title shown next to the track
    pub title: Option<String>,
    /// Artist shown next to the track
    pub artist_name: Option<String>,
}

/// Parsed media playlist
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamManifest {
    /// Directory of the playlist URL, ending in `/`
    pub base_url: String,
    /// Initialization segment (`#EXT-X-MAP`), fetched first
    pub init_segment_url: Option<String>,
    /// Media segments in playlist order
    pub segment_urls: Vec<String>,
}

impl StreamManifest {
    /// Every URL to fetch, in the order the bytes must be concatenated
    pub fn fetch_order(&self) -> Vec<&str> {
        self.init_segment_url
            .iter()
            .chain(self.segment_urls.iter())
            .map(String::as_str)
            .collect()
    }
}

/// The bytes of one finished download and the name to save them under
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name
    pub filename: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Result of a batch (playlist or likes) run
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    /// Collection title
    pub title: String,
    /// Successfully downloaded tracks, in collection order
    pub artifacts: Vec<Artifact>,
    /// Tracks processed before the run ended (succeeded + failed)
    pub attempted: usize,
    /// Tracks skipped because of a track-scoped error
    pub failed: usize,
    /// Tracks in the collection
    pub total: usize,
    /// Whether the run stopped early on request
    pub cancelled: bool,
    /// Store-only ZIP holding every artifact
    pub archive: Artifact,
}

impl BatchOutcome {
    /// Tracks downloaded successfully
    pub fn succeeded(&self) -> usize {
        self.artifacts.len()
    }

    /// Terminal status line, e.g. `Cancelled: 2/5 tracks downloaded`
    pub fn summary(&self) -> String {
        let state = if self.cancelled { "Cancelled" } else { "Done" };
        let mut line = format!(
            "{}: {}/{} tracks downloaded",
            state,
            self.succeeded(),
            self.total
        );
        if self.failed > 0 {
            line.push_str(&format!(" ({} failed)", self.failed));
        }
        line
    }
}

/// Event emitted by the downloader
///
/// Consumers subscribe via [`Downloader::subscribe`](crate::Downloader::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Free-text status with overall progress
    Progress {
        /// Status text
        message: String,
        /// Percentage (0 to 100)
        percent: u8,
    },

    /// A batch item was skipped
    TrackFailed {
        /// Position in the collection (0-based)
        index: usize,
        /// Tracks in the collection
        total: usize,
        /// Track id
        track_id: u64,
        /// Error message
        error: String,
    },

    /// A batch run ended (archive built or not)
    BatchFinished {
        /// Tracks downloaded
        succeeded: usize,
        /// Tracks skipped
        failed: usize,
        /// Tracks in the collection
        total: usize,
        /// Whether the run was cancelled
        cancelled: bool,
    },
}
