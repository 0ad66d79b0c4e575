//! Unified error handling for the reelcost crate
//!
//! Domain-specific errors live in [`crate::utils::error`]; this module folds
//! them into a single [`Error`] enum and classifies them so the pipeline can
//! decide, per film, whether to degrade or report.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reelcost::error::{ClassifiedError, Error};
//!
//! fn handle_error(err: Error) {
//!     tracing::warn!(error = %err, category = %err.category(), "Film failed");
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::utils::error::{CacheError, FetchError, ParseError};

/// Common trait for all reelcost error types
pub trait ClassifiedError: std::error::Error {
    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Upstream site unreachable or answered with an error
    Network,
    /// Listing or price document could not be parsed
    Parsing,
    /// A per-film deadline expired
    Timeout,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Stable lowercase label, used for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Timeout => "timeout",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the reelcost crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Price lookup for one film exceeded its deadline
    #[error("Timed out after {timeout_secs}s resolving prices for film {film_id}")]
    FilmTimeout { film_id: String, timeout_secs: u64 },

    /// A per-film task ended without reporting a result
    #[error("Price task for film {film_id} aborted: {reason}")]
    TaskAborted { film_id: String, reason: String },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ClassifiedError for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::FilmTimeout { .. } => ErrorCategory::Timeout,
            Self::TaskAborted { .. } | Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::Timeout);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let parse_err = Error::Parse(ParseError::InvalidPrice("abc".into()));
        assert_eq!(parse_err.category(), ErrorCategory::Parsing);

        let timeout = Error::FilmTimeout {
            film_id: "51568".into(),
            timeout_secs: 20,
        };
        assert_eq!(timeout.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn test_other_error_message() {
        let err = Error::other("director name is empty");
        assert_eq!(err.to_string(), "director name is empty");
        assert_eq!(err.category(), ErrorCategory::Other);
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = ParseError::MalformedDocument("best".into()).into();
        assert!(matches!(unified, Error::Parse(_)));
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&ErrorCategory::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }
}
