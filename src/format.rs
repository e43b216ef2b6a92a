//! Transcoding selection
//!
//! Fixed priority, first match wins:
//! 1. progressive MPEG audio
//! 2. adaptive AAC whose preset mentions `aac_160` or whose quality is high
//! 3. any adaptive AAC
//! 4. adaptive MPEG audio

use crate::error::{Error, Result};
use crate::types::{Protocol, TrackDescriptor, Transcoding};

/// Quality tiers treated as "high"; the server emits `hq`
const HIGH_QUALITY: [&str; 2] = ["hq", "high"];

type Rule = fn(&Transcoding) -> bool;

const PRIORITY: [Rule; 4] = [
    |t| t.protocol == Protocol::Progressive && t.is_mpeg_audio(),
    |t| t.protocol == Protocol::Adaptive && t.is_mp4_audio() && is_high_quality(t),
    |t| t.protocol == Protocol::Adaptive && t.is_mp4_audio(),
    |t| t.protocol == Protocol::Adaptive && t.is_mpeg_audio(),
];

fn is_high_quality(t: &Transcoding) -> bool {
    t.preset.as_deref().is_some_and(|p| p.contains("aac_160"))
        || t
            .quality
            .as_deref()
            .is_some_and(|q| HIGH_QUALITY.contains(&q))
}

/// Pick the transcoding to download, or `None` if nothing is supported
pub fn select(transcodings: &[Transcoding]) -> Option<&Transcoding> {
    PRIORITY
        .iter()
        .find_map(|rule| transcodings.iter().find(|t| rule(t)))
}

/// [`select`] over a track's transcodings, failing with [`Error::NoSupportedFormat`]
pub fn select_for(track: &TrackDescriptor) -> Result<&Transcoding> {
    select(&track.transcodings).ok_or(Error::NoSupportedFormat { track_id: track.id })
}
