use super::*;
use crate::downloader::test_helpers::{create_test_downloader, drain_events, progress_messages};
use crate::downloader::track_filename;
use crate::error::Error;
use crate::test_helpers::{
    CLIENT_ID, PAGE, progressive_track_json, query_param, route_progressive_stream,
};
use crate::types::{Protocol, TrackDescriptor, TrackHints, Transcoding};

const TRACK_URL: &str = "https://soundcloud.test/daft-punk/one-more-time";

fn resolve_endpoint() -> String {
    format!("{}/resolve", API)
}

fn mp3() -> Transcoding {
    Transcoding {
        protocol: Protocol::Progressive,
        mime_type: "audio/mpeg".into(),
        preset: None,
        quality: None,
        resolve_url: format!("{}/media/1/progressive", API),
    }
}

#[test]
fn test_filename_prefers_record_fields_over_hints() {
    let track = TrackDescriptor {
        id: 7,
        title: Some("One More Time".into()),
        artist_name: Some("Daft Punk".into()),
        transcodings: vec![mp3()],
        authorization_token: None,
    };
    let hints = TrackHints {
        title: Some("ignored".into()),
        artist_name: Some("ignored".into()),
    };
    assert_eq!(
        track_filename(&track, &hints, &mp3()),
        "daft_punk_one_more_time.mp3"
    );
}

#[test]
fn test_filename_falls_back_to_hints_then_id() {
    let bare = TrackDescriptor {
        id: 7,
        title: None,
        artist_name: None,
        transcodings: vec![],
        authorization_token: None,
    };
    let hints = TrackHints {
        title: Some("Aerodynamic".into()),
        artist_name: None,
    };
    assert_eq!(track_filename(&bare, &hints, &mp3()), "aerodynamic.mp3");
    assert_eq!(
        track_filename(&bare, &TrackHints::default(), &mp3()),
        "track-7.mp3"
    );

    let symbols = TrackHints {
        title: Some("!!!".into()),
        artist_name: Some("???".into()),
    };
    assert_eq!(track_filename(&bare, &symbols, &mp3()), "track-7.mp3");
}

#[tokio::test]
async fn test_download_track_saves_progressive_file() {
    let transport = FakeTransport::new();
    transport.route_json(
        &resolve_endpoint(),
        progressive_track_json(1, "One More Time", "Daft Punk"),
    );
    route_progressive_stream(&transport, 1, b"ID3-mp3-bytes");

    let (downloader, dir) = create_test_downloader(transport.clone());
    let path = downloader
        .download_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap();

    assert_eq!(
        path,
        dir.path().join("downloads").join("daft_punk_one_more_time.mp3")
    );
    assert_eq!(std::fs::read(&path).unwrap(), b"ID3-mp3-bytes");

    let resolve = &transport.requests()[0];
    assert_eq!(query_param(resolve, "url").as_deref(), Some(TRACK_URL));
    assert_eq!(query_param(resolve, "client_id").as_deref(), Some(CLIENT_ID));

    // API calls carry the browser headers, the CDN fetch carries none
    let headers = transport.sent_headers();
    assert!(
        headers[0]
            .iter()
            .any(|(name, value)| name == "Origin" && value == "https://soundcloud.com")
    );
    assert_eq!(
        transport.request_paths().last().cloned(),
        Some(format!("{}/stream/1.mp3", CDN))
    );
    assert!(headers.last().unwrap().is_empty());
}

#[tokio::test]
async fn test_hls_track_reports_progress() {
    let transport = FakeTransport::new();
    transport.route_json(&resolve_endpoint(), hls_track_json(5, "Around", "Daft Punk"));
    route_hls_stream(&transport, 5);

    let (downloader, _dir) = create_test_downloader(transport.clone());
    let mut rx = downloader.subscribe();

    let artifact = downloader
        .fetch_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap();
    assert_eq!(artifact.filename, "daft_punk_around.m4a");
    assert_eq!(artifact.bytes, b"INIT-DATA");

    let events = drain_events(&mut rx);
    assert_eq!(
        progress_messages(&events),
        vec![
            "Resolving track...",
            "Fetching playlist...",
            "Downloading... (1/2)",
            "Downloading... (2/2)",
            "Download complete!",
        ]
    );
    assert!(matches!(
        events.last(),
        Some(crate::types::Event::Progress { percent: 100, .. })
    ));
}

#[tokio::test]
async fn test_auth_failure_refreshes_client_id_and_retries_once() {
    let transport = FakeTransport::new();
    transport.route(&resolve_endpoint(), HttpResponse::status(401));
    transport.route_json(
        &resolve_endpoint(),
        progressive_track_json(1, "One More Time", "Daft Punk"),
    );
    transport.route_text(PAGE, FRESH_PAGE);
    route_progressive_stream(&transport, 1, b"audio");

    let (downloader, _dir) = create_test_downloader(transport.clone());
    let artifact = downloader
        .fetch_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap();
    assert_eq!(artifact.bytes, b"audio");

    assert_eq!(transport.count(&resolve_endpoint()), 2);
    assert_eq!(transport.count(PAGE), 1);

    let resolves: Vec<String> = transport
        .requests()
        .into_iter()
        .filter(|u| u.starts_with(&resolve_endpoint()))
        .collect();
    assert_eq!(
        query_param(&resolves[0], "client_id").as_deref(),
        Some(CLIENT_ID)
    );
    assert_eq!(
        query_param(&resolves[1], "client_id").as_deref(),
        Some("freshClientId")
    );

    let stream_resolve = transport
        .requests()
        .into_iter()
        .find(|u| u.contains("/media/1/progressive"))
        .unwrap();
    assert_eq!(
        query_param(&stream_resolve, "client_id").as_deref(),
        Some("freshClientId")
    );
}

#[tokio::test]
async fn test_second_auth_failure_is_fatal() {
    let transport = FakeTransport::new();
    transport.route(&resolve_endpoint(), HttpResponse::status(401));
    transport.route(&resolve_endpoint(), HttpResponse::status(403));
    transport.route_text(PAGE, FRESH_PAGE);

    let (downloader, _dir) = create_test_downloader(transport.clone());
    let err = downloader
        .fetch_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AuthFailure { status: 403 }));
    assert_eq!(transport.count(&resolve_endpoint()), 2);
}

#[tokio::test]
async fn test_missing_client_id_after_rejection() {
    let transport = FakeTransport::new();
    transport.route(&resolve_endpoint(), HttpResponse::status(401));
    transport.route_text(PAGE, "<html><body>nothing here</body></html>");

    let (downloader, _dir) = create_test_downloader(transport.clone());
    let err = downloader
        .fetch_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoCredential));
    assert_eq!(transport.count(&resolve_endpoint()), 1);
}

#[tokio::test]
async fn test_unsupported_formats_only() {
    let transport = FakeTransport::new();
    transport.route_json(
        &resolve_endpoint(),
        serde_json::json!({
            "kind": "track",
            "id": 3,
            "title": "Locked",
            "media": { "transcodings": [{
                "url": format!("{}/media/3/enc", API),
                "format": { "protocol": "ctr-encrypted-hls", "mime_type": "audio/mp4" }
            }]}
        }),
    );

    let (downloader, _dir) = create_test_downloader(transport.clone());
    let err = downloader
        .fetch_track(TRACK_URL, &TrackHints::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoSupportedFormat { track_id: 3 }));
    assert_eq!(transport.count(&format!("{}/media/3/enc", API)), 0);
}
