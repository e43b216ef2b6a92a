//! Wire records returned by the public API
//!
//! Only the fields the engine reads are declared; everything else is ignored.

use crate::types::{Protocol, TrackDescriptor, Transcoding};
use serde::Deserialize;

/// Any object returned by `/resolve`, discriminated by its `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolved {
    /// A single track
    Track(TrackRecord),
    /// A playlist or album
    Playlist(PlaylistRecord),
    /// A user profile
    User(UserRecord),
    /// Anything else
    #[serde(other)]
    Other,
}

/// Full or abbreviated track record
#[derive(Clone, Debug, Deserialize)]
pub struct TrackRecord {
    /// Track id
    pub id: u64,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Uploader
    #[serde(default)]
    pub user: Option<UserRecord>,
    /// Transcodings; missing on abbreviated records
    #[serde(default)]
    pub media: Option<MediaRecord>,
    /// Token appended to stream resolve calls
    #[serde(default)]
    pub track_authorization: Option<String>,
    /// Some responses wrap the interesting fields in a nested track object
    #[serde(default)]
    pub track: Option<Box<TrackRecord>>,
}

/// User profile
#[derive(Clone, Debug, Deserialize)]
pub struct UserRecord {
    /// User id
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub username: Option<String>,
}

/// `media` object of a track
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaRecord {
    /// Encoded variants, in server order
    #[serde(default)]
    pub transcodings: Vec<TranscodingRecord>,
}

/// One entry of `media.transcodings`
#[derive(Clone, Debug, Deserialize)]
pub struct TranscodingRecord {
    /// Resolve URL (answers with the stream location)
    pub url: String,
    /// Encoder preset
    #[serde(default)]
    pub preset: Option<String>,
    /// Quality tier
    #[serde(default)]
    pub quality: Option<String>,
    /// Protocol and MIME type
    #[serde(default)]
    pub format: Option<FormatRecord>,
}

/// `format` object of a transcoding
#[derive(Clone, Debug, Deserialize)]
pub struct FormatRecord {
    /// Delivery protocol
    pub protocol: Protocol,
    /// MIME type
    pub mime_type: String,
}

/// Playlist or album
#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistRecord {
    /// Playlist id
    pub id: u64,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Tracks in order; all but the first few are usually stubs
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

/// One page of `/users/{id}/track_likes`
#[derive(Clone, Debug, Deserialize)]
pub struct LikesPage {
    /// Liked items on this page
    #[serde(default)]
    pub collection: Vec<LikeRecord>,
    /// Absent (or null) on the last page
    #[serde(default)]
    pub next_href: Option<String>,
}

/// One liked item
#[derive(Clone, Debug, Deserialize)]
pub struct LikeRecord {
    /// Missing when the liked item is not a track
    #[serde(default)]
    pub track: Option<TrackRecord>,
}

/// Answer of a transcoding's resolve URL
#[derive(Clone, Debug, Deserialize)]
pub struct StreamLocation {
    /// Progressive file or playlist URL
    #[serde(default)]
    pub url: Option<String>,
}

impl TranscodingRecord {
    /// `None` when the record carries no format
    pub fn into_transcoding(self) -> Option<Transcoding> {
        let format = self.format?;
        Some(Transcoding {
            protocol: format.protocol,
            mime_type: format.mime_type,
            preset: self.preset,
            quality: self.quality,
            resolve_url: self.url,
        })
    }
}

impl TrackRecord {
    /// Flatten into a descriptor, taking missing fields from the nested record
    pub fn into_descriptor(self) -> TrackDescriptor {
        let nested = self.track.map(|t| *t);
        let (nested_media, nested_auth, nested_title, nested_user) = match nested {
            Some(t) => (t.media, t.track_authorization, t.title, t.user),
            None => (None, None, None, None),
        };

        let transcodings = self
            .media
            .or(nested_media)
            .unwrap_or_default()
            .transcodings
            .into_iter()
            .filter_map(TranscodingRecord::into_transcoding)
            .collect();

        TrackDescriptor {
            id: self.id,
            title: self.title.or(nested_title).filter(|t| !t.is_empty()),
            artist_name: self
                .user
                .or(nested_user)
                .and_then(|u| u.username)
                .filter(|n| !n.is_empty()),
            transcodings,
            authorization_token: self.track_authorization.or(nested_auth),
        }
    }
}
