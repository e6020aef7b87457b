//! HTTP access to the node's status API.
//!
//! Extraction only needs raw payloads, so the seam is the small
//! [`NodeFetcher`] trait. [`HttpFetcher`] implements it over `reqwest`; tests
//! substitute in-memory fetchers.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::{HarvestError, Result};

/// Default base URL of the node API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP methods used against the node API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Plain read.
    Get,
    /// Request with an empty JSON body.
    Post,
}

/// Source of raw endpoint payloads.
pub trait NodeFetcher {
    /// Requests `path` below the node's base URL and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Transport` if the request fails, times out, or
    /// the response status is not a success.
    fn fetch(&self, method: Method, path: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// [`NodeFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Creates a fetcher for the node at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::Transport {
                url: base_url.clone(),
                reason: describe(&e),
            })?;
        Ok(Self { client, base_url })
    }

    /// Returns the base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL of `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl NodeFetcher for HttpFetcher {
    async fn fetch(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        debug!(url = %url, ?method, "requesting");

        let request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(Vec::<u8>::new()),
        };

        let response = request.send().await.map_err(|e| HarvestError::Transport {
            url: url.clone(),
            reason: describe(&e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Transport {
                url,
                reason: format!("unexpected status {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| HarvestError::Transport {
            url: url.clone(),
            reason: describe(&e),
        })?;

        debug!(url = %url, bytes = body.len(), "received response");
        Ok(body.to_vec())
    }
}

/// Renders an error with its source chain, which is where reqwest keeps the
/// useful part ("connection refused", "operation timed out").
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
