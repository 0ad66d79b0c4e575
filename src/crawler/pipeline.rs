//! Concurrent price resolution for a director's films
//!
//! Every film gets its own task; tasks report back over an mpsc channel and
//! the collector puts results back into discovery order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────┐     ┌─────────────┐
//! │  Film list  │────▶│ Tasks (JoinSet)      │────▶│  Collector  │
//! │  (indexed)  │     │ semaphore + deadline │     │ (by index)  │
//! └─────────────┘     └──────────────────────┘     └─────────────┘
//!                        │ cache-aside
//!                        ▼
//!                   PriceCache ──▶ PriceSource
//! ```
//!
//! A film that fails, times out or whose task dies still shows up in the
//! output, unpriced, with a matching [`FilmFailure`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::cache::PriceCache;
use crate::config::Config;
use crate::error::{ClassifiedError, Error, Result};
use crate::metrics;
use crate::models::{Film, FilmFailure, FilmPrices};
use crate::pricing::PriceSource;

// ============================================================================
// Configuration
// ============================================================================

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on films being priced at the same time
    pub max_concurrent_fetches: usize,

    /// Deadline for pricing a single film, once it holds a permit
    pub film_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 5,
            film_timeout: Duration::from_secs(20),
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.scraper.max_concurrent_fetches.max(1),
            film_timeout: config.film_timeout(),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Output of one fan-out/fan-in round
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    /// One record per input film, in input order
    pub prices: Vec<FilmPrices>,
    pub failures: Vec<FilmFailure>,
}

/// Resolves prices for many films with bounded concurrency
pub struct PricePipeline {
    cache: Arc<PriceCache>,
    source: Arc<dyn PriceSource>,
    /// Shared by every request served by this pipeline
    semaphore: Arc<Semaphore>,
    config: PipelineConfig,
}

impl PricePipeline {
    pub fn new(cache: Arc<PriceCache>, source: Arc<dyn PriceSource>, config: PipelineConfig) -> Self {
        let permits = config.max_concurrent_fetches.max(1);
        Self {
            cache,
            source,
            semaphore: Arc::new(Semaphore::new(permits)),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Price every film, returning exactly one record per film
    pub async fn resolve_all(&self, films: Vec<Film>) -> Resolved {
        let total = films.len();
        if total == 0 {
            return Resolved::default();
        }

        let _timer = metrics::start_resolve_timer();
        let (tx, mut rx) = mpsc::channel::<(usize, Result<FilmPrices>)>(total);
        let mut tasks = JoinSet::new();

        for (index, film) in films.iter().cloned().enumerate() {
            let tx = tx.clone();
            let cache = Arc::clone(&self.cache);
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&self.semaphore);
            let deadline = self.config.film_timeout;

            tasks.spawn(async move {
                let outcome = resolve_film(&film, &cache, source.as_ref(), &semaphore, deadline).await;
                // The receiver only goes away if the collector was dropped
                let _ = tx.send((index, outcome)).await;
            });
        }
        drop(tx);

        let mut slots: Vec<Option<Result<FilmPrices>>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = rx.recv().await {
            slots[index] = Some(outcome);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Film pricing task did not complete");
            }
        }

        let mut resolved = Resolved {
            prices: Vec::with_capacity(total),
            failures: Vec::new(),
        };

        for (film, slot) in films.into_iter().zip(slots) {
            let outcome = slot.unwrap_or_else(|| {
                Err(Error::TaskAborted {
                    film_id: film.id.clone(),
                    reason: "task ended without reporting".to_string(),
                })
            });

            match outcome {
                Ok(prices) => resolved.prices.push(prices),
                Err(e) => {
                    metrics::record_film_failure(e.category().as_str());
                    tracing::warn!(
                        film_id = %film.id,
                        film = %film.name,
                        category = %e.category(),
                        error = %e,
                        "Film left unpriced"
                    );
                    resolved.failures.push(FilmFailure::for_film(&film, &e));
                    resolved.prices.push(FilmPrices::unpriced(film));
                }
            }
        }

        tracing::debug!(
            films = total,
            failures = resolved.failures.len(),
            "Resolved film prices"
        );

        resolved
    }
}

/// Price one film under a concurrency permit and deadline
async fn resolve_film(
    film: &Film,
    cache: &PriceCache,
    source: &dyn PriceSource,
    semaphore: &Semaphore,
    deadline: Duration,
) -> Result<FilmPrices> {
    let _permit = semaphore.acquire().await.map_err(|e| Error::TaskAborted {
        film_id: film.id.clone(),
        reason: e.to_string(),
    })?;

    match tokio::time::timeout(deadline, cache.get_film_prices(film, source)).await {
        Ok(result) => result,
        Err(_) => Err(Error::FilmTimeout {
            film_id: film.id.clone(),
            timeout_secs: deadline.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::error::ErrorCategory;
    use crate::models::{PriceEntry, PriceType};
    use crate::utils::error::FetchError;
    use async_trait::async_trait;

    struct FixedSource;

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch_prices(&self, film: &Film) -> Result<Vec<PriceEntry>> {
            if film.id == "broken" {
                return Err(FetchError::ServerError(503).into());
            }
            Ok(vec![PriceEntry::for_film(film, PriceType::Rent, "Vudu", "HD", 2.99)])
        }
    }

    fn film(id: &str) -> Film {
        Film {
            id: id.into(),
            name: format!("Film {id}"),
            ..Default::default()
        }
    }

    fn pipeline() -> PricePipeline {
        let cache = PriceCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60), "directors");
        PricePipeline::new(Arc::new(cache), Arc::new(FixedSource), PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_empty_input() {
        let resolved = pipeline().resolve_all(Vec::new()).await;
        assert!(resolved.prices.is_empty());
        assert!(resolved.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_film_in_output() {
        let films = vec![film("1"), film("broken"), film("3")];
        let resolved = pipeline().resolve_all(films).await;

        let ids: Vec<_> = resolved.prices.iter().map(|p| p.film_details.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "broken", "3"]);
        assert!(resolved.prices[1].price_entries.is_empty());
        assert_eq!(resolved.failures.len(), 1);
        assert_eq!(resolved.failures[0].film_id, "broken");
        assert_eq!(resolved.failures[0].category, ErrorCategory::Network);
    }

    #[test]
    fn test_config_never_zero_permits() {
        let mut config = Config::default();
        config.scraper.max_concurrent_fetches = 0;
        assert_eq!(PipelineConfig::from_config(&config).max_concurrent_fetches, 1);
    }
}
