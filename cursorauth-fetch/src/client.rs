//! Shared HTTP client for the provisioning service.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// User agent string for cursorauth.
const USER_AGENT: &str = concat!("cursorauth/", env!("CARGO_PKG_VERSION"));

/// reqwest client bound to the service base URL.
#[derive(Debug, Clone)]
pub struct ServiceHttp {
    inner: Client,
    base_url: String,
}

impl ServiceHttp {
    /// Creates a client for `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Url::parse(base_url)
            .map_err(|e| FetchError::InvalidConfig(format!("invalid base URL {base_url}: {e}")))?;

        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a POST request to `path`.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.inner.post(self.endpoint(path))
    }

    /// Starts a GET request to `path`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.inner.get(self.endpoint(path))
    }
}

/// Checks the status and parses the body as JSON.
///
/// Non-2xx responses become [`FetchError::Status`], using the body's
/// `detail` field when present.
pub(crate) async fn read_json(response: Response, endpoint: &'static str) -> Result<Value, FetchError> {
    let status = response.status();
    debug!(endpoint, status = %status, "Response received");

    let body = response.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        return Err(FetchError::Status {
            endpoint,
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| FetchError::MalformedResponse(format!("{endpoint}: invalid JSON: {e}")))
}
