//! Shared test helpers: a scripted in-memory transport and fixture builders.

use crate::credentials::Clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Transport that serves canned responses keyed by URL without its query string
///
/// A route may queue several responses; the last one repeats once the others are
/// used up. Unknown URLs answer 404. Every request URL is recorded in order.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    hooks: Mutex<HashMap<String, Hook>>,
    requests: Mutex<Vec<String>>,
    headers: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `url` (query string ignored when matching)
    pub(crate) fn route(&self, url: &str, response: HttpResponse) {
        self.routes
            .lock()
            .unwrap()
            .entry(strip_query(url).to_string())
            .or_default()
            .push_back(response);
    }

    pub(crate) fn route_text(&self, url: &str, body: &str) {
        self.route(url, HttpResponse::ok(body));
    }

    pub(crate) fn route_json(&self, url: &str, body: serde_json::Value) {
        self.route(url, HttpResponse::ok(body.to_string()));
    }

    /// Run `hook` whenever `url` is requested, before answering
    pub(crate) fn on_request(&self, url: &str, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks
            .lock()
            .unwrap()
            .insert(strip_query(url).to_string(), Box::new(hook));
    }

    /// Full URLs requested so far, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Requested URLs with the query string removed
    pub(crate) fn request_paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|u| strip_query(u).to_string())
            .collect()
    }

    /// Headers sent with each request, in order
    pub(crate) fn sent_headers(&self) -> Vec<Vec<(String, String)>> {
        self.headers.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, url: &str) -> usize {
        let key = strip_query(url);
        self.requests()
            .iter()
            .filter(|u| strip_query(u) == key)
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.headers.lock().unwrap().push(headers.to_vec());

        let key = strip_query(url);
        if let Some(hook) = self.hooks.lock().unwrap().get(key) {
            hook();
        }

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(key) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) => queue.front().cloned().ok_or(Error::Http {
                status: 404,
                url: url.to_string(),
            }),
            None => Ok(HttpResponse::status(404)),
        }
    }
}

pub(crate) fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Query parameter value from a recorded URL
pub(crate) fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Clock frozen at a settable instant
pub(crate) struct FixedClock(pub(crate) Mutex<DateTime<Utc>>);

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Test configuration: API at `https://api.test`, no pacing, pre-captured client id
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.api.base_url = API.to_string();
    config.credentials.page_url = PAGE.to_string();
    config.credentials.client_id = Some(CLIENT_ID.to_string());
    config.batch.pacing_delay = std::time::Duration::ZERO;
    config
}

pub(crate) const API: &str = "https://api.test";
pub(crate) const PAGE: &str = "https://page.test/";
pub(crate) const CDN: &str = "https://cdn.test";
pub(crate) const CLIENT_ID: &str = "testclientid0123456789";

/// Track record JSON with one progressive MP3 transcoding
pub(crate) fn progressive_track_json(id: u64, title: &str, artist: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "track",
        "id": id,
        "title": title,
        "user": { "id": 900 + id, "username": artist },
        "track_authorization": format!("auth-{}", id),
        "media": {
            "transcodings": [{
                "url": format!("{}/media/{}/progressive", API, id),
                "preset": "mp3_1_0",
                "quality": "sq",
                "format": { "protocol": "progressive", "mime_type": "audio/mpeg" }
            }]
        }
    })
}

/// Route the resolve + stream fetch for a progressive track built by
/// [`progressive_track_json`]; the audio bytes are `payload`
pub(crate) fn route_progressive_stream(transport: &FakeTransport, id: u64, payload: &[u8]) {
    let stream_url = format!("{}/stream/{}.mp3", CDN, id);
    transport.route_json(
        &format!("{}/media/{}/progressive", API, id),
        serde_json::json!({ "url": stream_url }),
    );
    transport.route(&stream_url, HttpResponse::ok(payload.to_vec()));
}
