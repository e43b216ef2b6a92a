//! API records, playlists and mock mounting helpers

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access id served by the mock page
pub const PAGE_CLIENT_ID: &str = "pageClientId0123456789";

/// Page whose bootstrap data carries [`PAGE_CLIENT_ID`]
pub fn bootstrap_page() -> String {
    format!(
        r#"<html><head><script>window.__sc_hydration = [{{"hydratable":"anonymousId","data":"{}"}}];</script></head></html>"#,
        PAGE_CLIENT_ID
    )
}

/// Full track record with a single progressive MP3 transcoding
pub fn progressive_track(base: &str, id: u64, title: &str, artist: &str) -> Value {
    json!({
        "kind": "track",
        "id": id,
        "title": title,
        "user": { "id": 1000 + id, "username": artist },
        "track_authorization": format!("auth-{}", id),
        "media": { "transcodings": [{
            "url": format!("{}/media/{}/progressive", base, id),
            "preset": "mp3_1_0",
            "quality": "sq",
            "format": { "protocol": "progressive", "mime_type": "audio/mpeg" }
        }]}
    })
}

/// Full track record offering MP3-over-HLS and high quality AAC-over-HLS
pub fn hls_track(base: &str, id: u64, title: &str, artist: &str) -> Value {
    json!({
        "kind": "track",
        "id": id,
        "title": title,
        "user": { "id": 1000 + id, "username": artist },
        "track_authorization": format!("auth-{}", id),
        "media": { "transcodings": [
            {
                "url": format!("{}/media/{}/hls-mp3", base, id),
                "preset": "mp3_1_0",
                "quality": "sq",
                "format": { "protocol": "hls", "mime_type": "audio/mpeg" }
            },
            {
                "url": format!("{}/media/{}/hls-aac", base, id),
                "preset": "aac_160k",
                "quality": "hq",
                "format": { "protocol": "hls", "mime_type": "audio/mp4; codecs=\"mp4a.40.2\"" }
            }
        ]}
    })
}

/// Abbreviated record as found past the first few entries of a playlist
pub fn stub_track(id: u64) -> Value {
    json!({ "kind": "track", "id": id })
}

/// Serve `body` as JSON for GET `route`
pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `body` as raw bytes for GET `route`
pub async fn mount_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mount the stream resolve answer and file for a [`progressive_track`]
pub async fn mount_progressive_stream(server: &MockServer, id: u64, payload: &[u8]) {
    let file = format!("/cdn/{}.mp3", id);
    mount_json(
        server,
        &format!("/media/{}/progressive", id),
        json!({ "url": format!("{}{}", server.uri(), file) }),
    )
    .await;
    mount_bytes(server, &file, payload).await;
}

/// Mount master playlist, media playlist, init and segments for the AAC
/// transcoding of an [`hls_track`]; returns the bytes assembly must yield
pub async fn mount_hls_stream(server: &MockServer, id: u64) -> Vec<u8> {
    let dir = format!("/cdn/hls/{}", id);
    mount_json(
        server,
        &format!("/media/{}/hls-aac", id),
        json!({ "url": format!("{}{}/master.m3u8?Policy=abc", server.uri(), dir) }),
    )
    .await;
    mount_bytes(
        server,
        &format!("{}/master.m3u8", dir),
        b"#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=165000,CODECS=\"mp4a.40.2\"\nvariant/playlist.m3u8\n",
    )
    .await;
    mount_bytes(
        server,
        &format!("{}/variant/playlist.m3u8", dir),
        b"#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-MAP:URI=\"init.mp4\"\n#EXTINF:10.0,\nseg-0.m4s\n#EXTINF:10.0,\nseg-1.m4s\n#EXT-X-ENDLIST\n",
    )
    .await;
    mount_bytes(server, &format!("{}/variant/init.mp4", dir), b"ftyp-init").await;
    mount_bytes(server, &format!("{}/variant/seg-0.m4s", dir), b"|moof-0").await;
    mount_bytes(server, &format!("{}/variant/seg-1.m4s", dir), b"|moof-1").await;

    b"ftyp-init|moof-0|moof-1".to_vec()
}
