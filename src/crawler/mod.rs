//! Director price crawling
//!
//! This module ties together everything needed to price a director's
//! filmography:
//! - [`fetcher`] - rate-limited HTTP access to the film site
//! - [`url`] - listing, film and availability URLs
//! - [`discovery`] - films on a director's listing page
//! - [`pipeline`] - bounded, cache-aside price resolution per film

pub mod discovery;
pub mod fetcher;
pub mod pipeline;
pub mod url;

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::cache::{self, PriceCache};
use crate::config::Config;
use crate::error::Error;
use crate::metrics;
use crate::models::{DirectorReport, FilmFailure};
use crate::pricing::{preferred_set, select_and_aggregate, AvailabilityFetcher, PriceSource};
use crate::utils::title_case;

use self::discovery::{Discovery, FilmDiscovery};
use self::fetcher::SiteFetcher;
use self::pipeline::{PipelineConfig, PricePipeline};
use self::url::SiteUrls;

/// Main entry point: director name in, priced report out
pub struct DirectorCrawler {
    discovery: FilmDiscovery,
    pipeline: PricePipeline,
    cache: Arc<PriceCache>,
}

impl DirectorCrawler {
    /// Create a crawler from configuration
    ///
    /// Connects to the cache (falling back to an in-process store) and builds
    /// the shared HTTP client.
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let fetcher = Arc::new(
            SiteFetcher::from_config(&config.scraper).context("Failed to create HTTP client")?,
        );
        let urls = SiteUrls::from_config(&config.scraper);

        let store = cache::connect(&config.cache).await;
        let cache = Arc::new(PriceCache::from_config(store, &config.cache));
        let source: Arc<dyn PriceSource> = Arc::new(AvailabilityFetcher::new(Arc::clone(&fetcher)));

        Ok(Self::with_components(
            FilmDiscovery::new(fetcher, urls),
            cache,
            source,
            PipelineConfig::from_config(config),
        ))
    }

    /// Assemble a crawler from prebuilt parts
    pub fn with_components(
        discovery: FilmDiscovery,
        cache: Arc<PriceCache>,
        source: Arc<dyn PriceSource>,
        pipeline_config: PipelineConfig,
    ) -> Self {
        let pipeline = PricePipeline::new(Arc::clone(&cache), source, pipeline_config);
        Self {
            discovery,
            pipeline,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    /// Price every film by `director`, preferring the given streaming services
    ///
    /// Never fails as a whole: listing and per-film problems are reported in
    /// [`DirectorReport::failures`] and the affected films count as unpriced.
    pub async fn scrape_director(&self, director: &str, services: &[String]) -> DirectorReport {
        metrics::record_director_request();

        let director = director.trim();
        let display_name = title_case(director);
        let mut failures = Vec::new();

        let discovered: Discovery = if director.is_empty() {
            let error = Error::other("director name is empty");
            failures.push(FilmFailure::new("", "", &error));
            Discovery::default()
        } else {
            match self.discovery.discover_films(director).await {
                Ok(discovery) => discovery,
                Err(e) => {
                    tracing::warn!(director, error = %e, "Failed to fetch director listing");
                    failures.push(FilmFailure::new("", display_name.clone(), &Error::Fetch(e)));
                    Discovery::default()
                }
            }
        };
        failures.extend(discovered.failures);

        let found_films = !discovered.films.is_empty();
        let resolved = self.pipeline.resolve_all(discovered.films).await;
        failures.extend(resolved.failures);

        let (films, price_details) = select_and_aggregate(resolved.prices, &preferred_set(services));

        if found_films {
            self.cache.record_director(director).await;
        }

        let report = DirectorReport {
            director: display_name,
            films,
            price_details,
            failures,
            generated_at: Utc::now(),
        };

        tracing::info!(
            director = %report.director,
            films = report.films.len(),
            priced = report.price_details.num_films,
            streaming = report.streaming_count(),
            overall_price = %report.price_details.overall_price_display(),
            failures = report.failures.len(),
            "Priced director filmography"
        );

        report
    }

    /// Directors that have been priced before
    pub async fn known_directors(&self) -> Vec<String> {
        self.cache.known_directors().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::error::ErrorCategory;
    use crate::models::{Film, PriceEntry};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoPrices;

    #[async_trait]
    impl PriceSource for NoPrices {
        async fn fetch_prices(&self, _film: &Film) -> crate::error::Result<Vec<PriceEntry>> {
            Ok(Vec::new())
        }
    }

    fn crawler(base_url: &str) -> DirectorCrawler {
        let fetcher = Arc::new(SiteFetcher::with_config(100, Duration::from_secs(2), "test").unwrap());
        let cache = Arc::new(PriceCache::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(60),
            "directors",
        ));
        DirectorCrawler::with_components(
            FilmDiscovery::new(fetcher, SiteUrls::new(base_url, "USA")),
            cache,
            Arc::new(NoPrices),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_blank_director_is_reported_not_fetched() {
        let report = crawler("http://127.0.0.1:1").scrape_director("   ", &[]).await;
        assert!(report.films.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].category, ErrorCategory::Other);
        assert_eq!(report.price_details.price_per_film, None);
    }

    #[tokio::test]
    async fn test_unreachable_listing_degrades() {
        let crawler = crawler("http://127.0.0.1:1");
        let report = crawler.scrape_director("agnes varda", &[]).await;

        assert_eq!(report.director, "Agnes Varda");
        assert!(report.films.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].category, ErrorCategory::Network);
        assert!(crawler.known_directors().await.is_empty());
    }
}
