//! HTTP transport used for every network call
//!
//! The engine only needs `GET` with custom headers and raw-byte bodies. Text
//! responses (JSON, playlists, scripts) are decoded from the same bytes.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Request headers as name/value pairs
pub type Headers = Vec<(String, String)>;

/// Status and body of a completed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with status 200
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Response with an arbitrary status and empty body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    /// 2xx and 3xx count as success
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Map a failed status to an error: 401/403 become [`Error::AuthFailure`]
    pub fn error_for_status(self, url: &str) -> Result<Self> {
        match self.status {
            _ if self.is_success() => Ok(self),
            401 | 403 => Err(Error::AuthFailure {
                status: self.status,
            }),
            status => Err(Error::Http {
                status,
                url: url.to_string(),
            }),
        }
    }

    /// Body decoded as UTF-8 (invalid sequences replaced)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Network access point for the engine
///
/// Implementations return every completed exchange as `Ok`, whatever the status;
/// only transport-level failures (DNS, TLS, timeout) are `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(url, status, bytes = body.len(), "GET complete");
        Ok(HttpResponse { status, body })
    }
}
