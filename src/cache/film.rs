//! Cache-aside access to per-film prices and the known-directors set

use std::sync::Arc;
use std::time::Duration;

use super::KeyValueStore;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::{Film, FilmPrices};
use crate::pricing::PriceSource;
use crate::utils::error::CacheError;
use crate::utils::title_case;

/// Film price cache and director set over a [`KeyValueStore`]
///
/// Read and write failures never surface to the caller: a failed read is a
/// miss and a failed write only costs a future refetch.
pub struct PriceCache {
    store: Arc<dyn KeyValueStore>,
    film_ttl: Duration,
    directors_key: String,
}

impl PriceCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        film_ttl: Duration,
        directors_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            film_ttl,
            directors_key: directors_key.into(),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::new(
            store,
            Duration::from_secs(config.film_ttl_secs),
            config.directors_key.clone(),
        )
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Prices for `film`, from cache when present, otherwise from `source`
    ///
    /// A fetched record is written back with the film TTL before it is
    /// returned. Records come back with raw `price_entries` only; best-price
    /// selection happens later, per request.
    ///
    /// # Errors
    ///
    /// Only errors from `source` are returned.
    pub async fn get_film_prices(
        &self,
        film: &Film,
        source: &dyn PriceSource,
    ) -> Result<FilmPrices> {
        if let Some(cached) = self.lookup(film).await {
            return Ok(cached);
        }

        let entries = source.fetch_prices(film).await?;
        let prices = FilmPrices::new(film.clone(), entries);
        self.insert(&prices).await;

        Ok(prices)
    }

    /// Cached record for `film`, if one exists and decodes
    pub async fn lookup(&self, film: &Film) -> Option<FilmPrices> {
        match self.store.get(&film.id).await {
            Ok(Some(bytes)) if !bytes.is_empty() => match decode_film_prices(&bytes) {
                Ok(prices) => {
                    metrics::record_cache_lookup("hit");
                    tracing::debug!(film_id = %film.id, "Film price cache hit");
                    Some(prices)
                }
                Err(e) => {
                    metrics::record_cache_lookup("corrupt");
                    tracing::warn!(
                        film_id = %film.id,
                        error = %e,
                        "Discarding malformed cached prices"
                    );
                    None
                }
            },
            Ok(_) => {
                metrics::record_cache_lookup("miss");
                tracing::debug!(film_id = %film.id, "Film price cache miss");
                None
            }
            Err(e) => {
                metrics::record_cache_lookup("error");
                tracing::warn!(
                    film_id = %film.id,
                    backend = self.store.backend(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    /// Write `prices` under its film id
    pub async fn insert(&self, prices: &FilmPrices) {
        let film_id = &prices.film_details.id;

        let result = match encode_film_prices(prices) {
            Ok(bytes) => self.store.set(film_id, &bytes, self.film_ttl).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                metrics::record_cache_write(true);
                tracing::debug!(film_id = %film_id, ttl_secs = self.film_ttl.as_secs(), "Cached film prices");
            }
            Err(e) => {
                metrics::record_cache_write(false);
                tracing::warn!(film_id = %film_id, error = %e, "Failed to cache film prices");
            }
        }
    }

    /// Remember a director whose listing produced films
    pub async fn record_director(&self, name: &str) {
        let name = title_case(name);
        if name.is_empty() {
            return;
        }

        if let Err(e) = self.store.set_add(&self.directors_key, &name).await {
            tracing::warn!(director = %name, error = %e, "Failed to record director");
        }
    }

    /// Every recorded director, sorted
    pub async fn known_directors(&self) -> Vec<String> {
        match self.store.set_members(&self.directors_key).await {
            Ok(mut directors) => {
                directors.sort();
                directors
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list cached directors");
                Vec::new()
            }
        }
    }
}

/// Encode a record for the cache
pub fn encode_film_prices(prices: &FilmPrices) -> std::result::Result<Vec<u8>, CacheError> {
    serde_json::to_vec(prices).map_err(CacheError::from)
}

/// Decode a cached record
pub fn decode_film_prices(bytes: &[u8]) -> std::result::Result<FilmPrices, CacheError> {
    serde_json::from_slice(bytes).map_err(CacheError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::models::{PriceEntry, PriceType};

    fn film() -> Film {
        Film {
            id: "51568".into(),
            slug: "/film/the-master/".into(),
            url: "https://letterboxd.com/film/the-master/".into(),
            services_url: "https://letterboxd.com/s/film-availability?filmId=51568&locale=USA"
                .into(),
            name: "The Master".into(),
            year: 2012,
        }
    }

    fn cache(store: Arc<MemoryStore>) -> PriceCache {
        PriceCache::new(store, Duration::from_secs(60), "directors")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let film = film();
        let mut prices = FilmPrices::new(
            film.clone(),
            vec![
                PriceEntry::for_film(&film, PriceType::Streaming, "Netflix", "HD", 0.0),
                PriceEntry::for_film(&film, PriceType::Rent, "Apple TV", "4K", 3.99),
            ],
        );
        prices.cheapest_rental = Some(prices.price_entries[1].clone());

        let bytes = encode_film_prices(&prices).unwrap();
        assert_eq!(decode_film_prices(&bytes).unwrap(), prices);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_film_prices(b"not json"),
            Err(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("51568", b"{\"filmName\": 3}", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache(store).lookup(&film()).await.is_none());
    }

    #[tokio::test]
    async fn test_directors_title_cased_and_sorted() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache(store);
        cache.record_director("wes anderson").await;
        cache.record_director("agnès varda").await;
        cache.record_director("wes anderson").await;

        assert_eq!(
            cache.known_directors().await,
            vec!["Agnès Varda".to_string(), "Wes Anderson".to_string()]
        );
    }
}
