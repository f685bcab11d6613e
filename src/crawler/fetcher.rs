//! Page fetcher implementation
//!
//! This module defines the `Fetcher` seam the crawl workers call, and the
//! default HTTP implementation. Each fetch runs inside its own
//! [`RenderSession`]: a dedicated client that is never shared between
//! concurrent tasks and is torn down when the session is dropped, whichever
//! way the fetch exits.

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to open render session: {0}")]
    Session(String),

    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Processing of {url} aborted: {reason}")]
    Aborted { url: String, reason: String },
}

/// Source of rendered page markup
///
/// Implementations must wait for their settle delay before returning markup
/// so dynamically injected content has a chance to appear.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the markup of the page at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Default fetcher backed by `reqwest`
pub struct HttpFetcher {
    config: FetcherConfig,
    settle_delay: Duration,
}

impl HttpFetcher {
    /// Creates a new HTTP fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - User agent and timeouts for every session
    /// * `settle_delay` - Wait between receiving the response head and
    ///   reading the body
    pub fn new(config: FetcherConfig, settle_delay: Duration) -> Self {
        Self {
            config,
            settle_delay,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let session = RenderSession::open(&self.config, url)?;
        session.render(self.settle_delay).await
    }
}

/// A single-use rendering resource owned by exactly one fetch
///
/// The session owns its own HTTP client with connection pooling disabled, so
/// no connection or cookie state leaks between pages. Dropping the session
/// releases the client.
pub struct RenderSession {
    client: Client,
    url: Url,
}

impl RenderSession {
    /// Opens a session for `url`
    ///
    /// # Returns
    ///
    /// * `Ok(RenderSession)` - Session ready to render
    /// * `Err(FetchError::Session)` - The HTTP client could not be built
    pub fn open(config: &FetcherConfig, url: &Url) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(0)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Session(e.to_string()))?;

        tracing::trace!("Opened render session for {}", url);

        Ok(Self {
            client,
            url: url.clone(),
        })
    }

    /// Requests the page, waits out the settle delay, then reads the markup
    ///
    /// A 404 is reported as `FetchError::NotFound`, any other non-success
    /// status as `FetchError::Status`.
    pub async fn render(&self, settle_delay: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(self.url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: self.url.to_string(),
            source,
        })
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        tracing::trace!("Closed render session for {}", self.url);
    }
}
