//! Implements the `Backend` trait with `reqwest` against a running API server.

use crate::api::{ApiError, Backend, Method};
use crate::error::Res;
use anyhow::Context;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Sends JSON requests to the API at `base_url`. Paths such as `/api/subscriptions` are appended to
/// the base URL as-is.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Res<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("The API base URL must use http or https, got '{base_url}'");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        trace!("{method} {url}");
        let mut request = self
            .client
            .request(method.into(), &url)
            .header(ACCEPT, "application/json");
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(from_reqwest)?;
        let status = response.status();
        let text = response.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            debug!("{method} {url} failed with status {status}");
            return Err(ApiError::from_response(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::invalid_response(format!("Ungültige API-Antwort: {e}")))
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Maps a failure where no usable response was received.
fn from_reqwest(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::timeout()
    } else if e.is_decode() {
        ApiError::invalid_response(e.to_string())
    } else {
        ApiError::network(e.to_string())
    }
}
