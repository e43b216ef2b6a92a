//! Line-oriented HLS playlist parsing.
//!
//! Only the directives the assembler acts on are interpreted:
//! `#EXT-X-STREAM-INF` (master playlist variant) and `#EXT-X-MAP` (init
//! segment). Every other `#` line is ignored.

use crate::types::StreamManifest;

const STREAM_INF: &str = "#EXT-X-STREAM-INF";
const MAP: &str = "#EXT-X-MAP:";

/// Directory part of a playlist URL, up to and including the last `/`
pub fn base_path(manifest_url: &str) -> &str {
    match manifest_url.rfind('/') {
        Some(idx) => &manifest_url[..=idx],
        None => "",
    }
}

/// Absolute references are kept; anything else is appended to `base`
pub fn resolve_reference(base: &str, reference: &str) -> String {
    if reference.starts_with("http") {
        reference.to_string()
    } else {
        format!("{}{}", base, reference)
    }
}

/// A master playlist lists variants instead of segments
pub fn is_master(text: &str) -> bool {
    text.contains(STREAM_INF)
}

/// Reference of the first variant, resolved against `base`
///
/// A variant's reference is the line right after its `#EXT-X-STREAM-INF`
/// directive. Directives not directly followed by a reference are passed over.
pub fn first_variant(text: &str, base: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    lines
        .windows(2)
        .filter(|pair| pair[0].starts_with(STREAM_INF))
        .map(|pair| pair[1])
        .find(|next| !next.is_empty() && !next.starts_with('#'))
        .map(|reference| resolve_reference(base, reference))
}

/// Parse a media playlist fetched from `manifest_url`
///
/// The init segment (if any) and all segments are resolved against the
/// playlist's directory, in file order.
pub fn parse_media(text: &str, manifest_url: &str) -> StreamManifest {
    let base = base_path(manifest_url);
    let mut manifest = StreamManifest {
        base_url: base.to_string(),
        ..StreamManifest::default()
    };

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(attrs) = line.strip_prefix(MAP) {
            // A later map replaces an earlier one
            if let Some(uri) = map_uri(attrs) {
                manifest.init_segment_url = Some(resolve_reference(base, uri));
            }
        } else if !line.starts_with('#') {
            manifest
                .segment_urls
                .push(resolve_reference(base, line));
        }
    }

    manifest
}

/// `URI="..."` attribute of an `#EXT-X-MAP` tag
fn map_uri(attrs: &str) -> Option<&str> {
    let start = attrs.find("URI=\"")? + "URI=\"".len();
    let rest = &attrs[start..];
    let end = rest.find('"')?;
    Some(&rest[..end]).filter(|uri| !uri.is_empty())
}
