//! Key-value caching layer
//!
//! This module provides the cache the pricing pipeline reads through:
//! - Film price cache: one JSON record per film id, 24 hour TTL
//! - Director set: every director whose listing produced films
//!
//! The store itself sits behind [`KeyValueStore`] so the pipeline can run
//! against Redis in production and an in-process map in tests or when Redis
//! is unavailable.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelcost::cache::{self, PriceCache};
//! use reelcost::config::CacheConfig;
//!
//! let config = CacheConfig::default();
//! let store = cache::connect(&config).await;
//! let prices = PriceCache::from_config(store, &config);
//! let directors = prices.known_directors().await;
//! ```

pub mod film;
pub mod store;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::utils::error::CacheError;

pub use film::{decode_film_prices, encode_film_prices, PriceCache};
pub use store::{MemoryStore, RedisStore};

/// Minimal key-value protocol the pipeline depends on
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` means the key is absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Write a value that expires after `ttl`
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Add a member to a set
    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError>;

    /// All members of a set (empty when the set does not exist)
    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Open the configured store, falling back to an in-process one
///
/// A disabled or unreachable Redis is not an error: prices are then cached
/// only for the lifetime of the process.
pub async fn connect(config: &CacheConfig) -> Arc<dyn KeyValueStore> {
    if !config.enabled {
        tracing::info!("Redis cache disabled, using in-process cache");
        return Arc::new(MemoryStore::new());
    }

    match RedisStore::connect(config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "Redis cache unavailable, continuing with in-process cache");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_uses_memory_store() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let store = connect(&config).await;
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back() {
        let config = CacheConfig {
            url: "redis://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let store = connect(&config).await;
        assert_eq!(store.backend(), "memory");
    }
}
