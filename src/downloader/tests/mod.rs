//! Downloader tests over a scripted transport.

use crate::http::HttpResponse;
use crate::test_helpers::{API, CDN, FakeTransport};
use serde_json::{Value, json};

mod single;

/// Track record JSON whose only transcoding is AAC over HLS
fn hls_track_json(id: u64, title: &str, artist: &str) -> Value {
    json!({
        "kind": "track",
        "id": id,
        "title": title,
        "user": { "id": 900 + id, "username": artist },
        "track_authorization": format!("auth-{}", id),
        "media": {
            "transcodings": [{
                "url": format!("{}/media/{}/hls", API, id),
                "preset": "aac_160k",
                "quality": "sq",
                "format": { "protocol": "hls", "mime_type": "audio/mp4; codecs=\"mp4a.40.2\"" }
            }]
        }
    })
}

/// Route the resolve call, media playlist, init segment and one media segment
/// of a track built by [`hls_track_json`]
fn route_hls_stream(transport: &FakeTransport, id: u64) {
    let playlist = format!("{}/hls/{}/playlist.m3u8", CDN, id);
    transport.route_json(
        &format!("{}/media/{}/hls", API, id),
        json!({ "url": format!("{}?sig=xyz", playlist) }),
    );
    transport.route_text(
        &playlist,
        "#EXTM3U\n#EXT-X-MAP:URI=\"init.mp4\"\n#EXTINF:10.0,\nseg-0.m4s\n#EXT-X-ENDLIST\n",
    );
    transport.route(
        &format!("{}/hls/{}/init.mp4", CDN, id),
        HttpResponse::ok(b"INIT".to_vec()),
    );
    transport.route(
        &format!("{}/hls/{}/seg-0.m4s", CDN, id),
        HttpResponse::ok(b"-DATA".to_vec()),
    );
}

/// Stub as it appears in large collections: id only, no media
fn stub_json(id: u64) -> Value {
    json!({ "kind": "track", "id": id })
}

/// Page HTML carrying a fresh access id in its bootstrap data
const FRESH_PAGE: &str = r#"<script>window.__sc_hydration = [{"hydratable":"anonymousId","data":"freshClientId"}];</script>"#;
