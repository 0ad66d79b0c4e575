//! HTTP fetcher with rate limiting
//!
//! This module provides the single HTTP client shared by film discovery and
//! the availability lookups:
//! - One pooled `reqwest` client with timeout and compression
//! - Rate limiting with governor
//! - Non-success statuses surfaced as typed errors (no retries)

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client, Response,
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::utils::error::FetchError;

/// Rate-limited fetcher for the upstream film site
pub struct SiteFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl SiteFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(
            requests_per_second,
            Duration::from_secs(30),
            &format!("reelcost/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(Self::default_headers())
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Create a fetcher from the scraper section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &ScraperConfig) -> Result<Self, FetchError> {
        Self::with_config(
            config.requests_per_second,
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
        )
    }

    /// Fetch a URL with rate limiting
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ServerError` for non-2xx answers,
    /// `FetchError::Timeout` when the request deadline passes and
    /// `FetchError::Http` for transport failures.
    pub async fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Fetching URL");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Upstream returned error status");
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Ok(response)
    }

    /// Fetch and decode response body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch(url).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Decode(format!("Failed to read response body: {e}")))
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(SiteFetcher::new(10).is_ok());
    }

    #[test]
    fn test_zero_rate_falls_back_to_one() {
        assert!(SiteFetcher::new(0).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_request() {
        let fetcher = SiteFetcher::new(10).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
