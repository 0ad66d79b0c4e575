//! Price retrieval and best-price selection
//!
//! - [`PriceSource`] - where raw price entries for a film come from
//! - [`AvailabilityFetcher`] - the upstream availability endpoint
//! - [`selector`] - per-request best-price choice and cost totals

pub mod selector;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::crawler::fetcher::SiteFetcher;
use crate::error::Result;
use crate::metrics;
use crate::models::{Film, PriceEntry};
use crate::parser::parse_availability;
use crate::utils::error::ParseError;

pub use selector::{calculate_totals, preferred_set, select_and_aggregate, sort_by_year};

/// Source of raw price entries for a single film
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Streaming entries first, then rentals, in upstream order
    async fn fetch_prices(&self, film: &Film) -> Result<Vec<PriceEntry>>;
}

/// Reads prices from the film's availability endpoint
pub struct AvailabilityFetcher {
    fetcher: Arc<SiteFetcher>,
}

impl AvailabilityFetcher {
    #[must_use]
    pub fn new(fetcher: Arc<SiteFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PriceSource for AvailabilityFetcher {
    async fn fetch_prices(&self, film: &Film) -> Result<Vec<PriceEntry>> {
        let body = match self.fetcher.fetch_text(&film.services_url).await {
            Ok(body) => body,
            Err(e) => {
                metrics::record_price_fetch("fetch_error");
                return Err(e.into());
            }
        };

        let entries = serde_json::from_str::<Value>(&body)
            .map_err(|e| ParseError::MalformedDocument(e.to_string()))
            .and_then(|document| parse_availability(&document, film));

        match entries {
            Ok(entries) => {
                metrics::record_price_fetch("success");
                tracing::debug!(
                    film_id = %film.id,
                    entries = entries.len(),
                    "Fetched film prices"
                );
                Ok(entries)
            }
            Err(e) => {
                metrics::record_price_fetch("parse_error");
                Err(e.into())
            }
        }
    }
}
