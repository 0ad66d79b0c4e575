//! Error types for the reelcost scraper
//!
//! This module defines the domain error types raised by the fetcher,
//! the parsers and the cache layer.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Map a reqwest error, keeping timeouts distinguishable
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors that can occur while parsing listing pages, price documents
/// or cached payloads
#[derive(Error, Debug)]
pub enum ParseError {
    /// Release year attribute present but not an integer
    #[error("Invalid release year {value:?} for film {film}")]
    InvalidYear { film: String, value: String },

    /// Listing element without a film id
    #[error("Film element has no id: {0}")]
    MissingFilmId(String),

    /// Price text that is neither a zero sentinel nor contains a decimal amount
    #[error("Invalid price text: {0:?}")]
    InvalidPrice(String),

    /// JSON document does not have the expected shape
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

/// Errors raised by the key-value cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Could not build the pool or check out a connection
    #[error("Cache pool error: {0}")]
    Pool(String),

    /// Protocol or connectivity error reported by Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Payload could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
