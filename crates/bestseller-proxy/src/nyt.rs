//! NYT Books API client
//!
//! Fetches the bestseller lists overview. The response body is treated as
//! an opaque JSON payload and returned verbatim; parsing is only used to
//! reject malformed bodies.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::{self, Display};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com/svc/books/v3";

#[derive(Debug)]
pub enum UpstreamError {
    /// NYT_API_KEY was not configured. Surfaced at first use rather than
    /// crashing at startup.
    MissingApiKey,
    Http(reqwest::Error),
    Status(StatusCode),
    MalformedBody(serde_json::Error),
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "NYT API key is not configured"),
            Self::Http(e) => write!(f, "Upstream request failed: {e}"),
            Self::Status(status) => write!(f, "Upstream returned status {status}"),
            Self::MalformedBody(e) => write!(f, "Upstream body is not valid JSON: {e}"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::MalformedBody(e) => Some(e),
            _ => None,
        }
    }
}

/// Source of the bestseller overview payload.
#[async_trait]
pub trait BestsellerSource: Send + Sync {
    /// Issue a single upstream GET and return the raw JSON body.
    async fn fetch_overview(&self) -> Result<String, UpstreamError>;
}

/// HTTP client for the NYT Books API.
pub struct NytClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NytClient {
    /// Create a client with a bounded request timeout. The upstream API is
    /// slow; an unbounded call would hang the refresh path.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl BestsellerSource for NytClient {
    async fn fetch_overview(&self) -> Result<String, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        let url = format!("{}/lists/full-overview.json", self.base_url);
        debug!(url = %url, "Fetching bestseller overview");

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", api_key)])
            .send()
            .await
            // The request URL carries the api-key; strip it before the
            // error can be logged or echoed.
            .map_err(|e| UpstreamError::Http(e.without_url()))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Http(e.without_url()))?;

        // Validate but keep the raw text so the stored payload stays
        // byte-for-byte identical to what upstream sent.
        serde_json::from_str::<serde_json::Value>(&body).map_err(UpstreamError::MalformedBody)?;

        Ok(body)
    }
}
