//! Page snapshot scanning for access ids and bearer tokens.
//!
//! A snapshot is taken from the HTML of the site's landing page: the bootstrap
//! array assigned to `window.__sc_hydration`, the bodies of inline `<script>`
//! tags, and the URLs of linked script bundles.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const BOOTSTRAP_MARKER: &str = "__sc_hydration";

#[allow(clippy::expect_used)]
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("literal regex is valid")
});

#[allow(clippy::expect_used)]
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).expect("literal regex is valid")
});

#[allow(clippy::expect_used)]
static INLINE_CLIENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']client_id["']\s*:\s*["']([a-zA-Z0-9]+)["']"#)
        .expect("literal regex is valid")
});

#[allow(clippy::expect_used)]
static BUNDLE_CLIENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"client_id[:=]["']([a-zA-Z0-9]{20,})['"]"#).expect("literal regex is valid")
});

/// What a page exposes for credential discovery
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageSnapshot {
    bootstrap: Vec<Value>,
    inline_scripts: Vec<String>,
    script_urls: Vec<String>,
}

impl PageSnapshot {
    /// Extract bootstrap data, inline scripts and absolute script URLs from `html`
    ///
    /// Relative `src` attributes are resolved against `page_url`.
    pub fn parse(html: &str, page_url: &str) -> Self {
        let base = url::Url::parse(page_url).ok();
        let mut snapshot = Self {
            bootstrap: parse_bootstrap(html),
            ..Self::default()
        };

        for caps in SCRIPT_TAG.captures_iter(html) {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            if let Some(src) = SRC_ATTR.captures(attrs).and_then(|c| c.get(1)) {
                let src = src.as_str();
                let absolute = match &base {
                    Some(base) => base.join(src).map(|u| u.to_string()).ok(),
                    None => url::Url::parse(src).map(|u| u.to_string()).ok(),
                };
                if let Some(absolute) = absolute {
                    snapshot.script_urls.push(absolute);
                }
            } else if !body.trim().is_empty() {
                snapshot.inline_scripts.push(body.to_string());
            }
        }

        snapshot
    }

    /// Access id carried by the `anonymousId` bootstrap item
    pub fn bootstrap_access_id(&self) -> Option<String> {
        self.bootstrap
            .iter()
            .find(|item| item.get("hydratable").and_then(Value::as_str) == Some("anonymousId"))
            .and_then(|item| item.get("data"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// Bearer token of the signed-in user (`user` bootstrap item)
    pub fn oauth_token(&self) -> Option<String> {
        self.bootstrap
            .iter()
            .filter(|item| item.get("hydratable").and_then(Value::as_str) == Some("user"))
            .find_map(|item| item.pointer("/data/oauth_token").and_then(Value::as_str))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// First `"client_id": "..."` assignment in an inline script
    pub fn inline_access_id(&self) -> Option<String> {
        self.inline_scripts
            .iter()
            .filter(|body| body.contains("client_id"))
            .find_map(|body| INLINE_CLIENT_ID.captures(body))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Linked script bundles served from `host`, in page order
    pub fn bundle_urls(&self, host: &str) -> Vec<&str> {
        self.script_urls
            .iter()
            .filter(|url| url.contains(host))
            .map(String::as_str)
            .collect()
    }
}

/// Access id embedded in a script bundle's source, if any
pub fn scan_bundle(source: &str) -> Option<String> {
    BUNDLE_CLIENT_ID
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_bootstrap(html: &str) -> Vec<Value> {
    let Some(marker) = html.find(BOOTSTRAP_MARKER) else {
        return Vec::new();
    };
    let rest = &html[marker + BOOTSTRAP_MARKER.len()..];
    let Some(eq) = rest.find('=') else {
        return Vec::new();
    };
    let json = rest[eq + 1..].trim_start();

    // Parse exactly one JSON value; whatever follows (`;</script>...`) is ignored
    match serde_json::Deserializer::from_str(json)
        .into_iter::<Vec<Value>>()
        .next()
    {
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "unreadable bootstrap data");
            Vec::new()
        }
        None => Vec::new(),
    }
}
