//! Redis and in-process implementations of [`KeyValueStore`]

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::config::CacheConfig;
use crate::utils::error::CacheError;

/// Redis-backed store over a bounded connection pool
///
/// Every operation checks a connection out of the pool for its own duration
/// only; the guard returns it on every exit path.
pub struct RedisStore {
    /// Connection pool
    pool: Pool,
}

impl RedisStore {
    /// Build the pool and verify the server answers PING
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let pool = PoolConfig::from_url(&config.url)
            .builder()
            .map_err(|e| CacheError::Pool(format!("Failed to create pool builder: {e}")))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CacheError::Pool(format!("Failed to create Redis connection pool: {e}")))?;

        let store = Self { pool };
        store.health_check().await?;

        tracing::info!(
            url = %redact_url(&config.url),
            pool_size = config.pool_size,
            "Connected to Redis"
        );

        Ok(store)
    }

    /// Check if the server is reachable
    pub async fn health_check(&self) -> Result<bool, CacheError> {
        let mut conn = self.pool.get().await?;
        let result: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(result == "PONG")
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Strip the password from a connection URL before logging it
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable redis url>".to_string(),
    }
}

/// In-process store with TTL support
///
/// Used when Redis is disabled or unreachable, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired values
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.values
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let values = self.values.read().await;
        Ok(values
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut values = self.values.write().await;
        // Expired entries are dropped on write so the map stays bounded by live keys
        values.retain(|_, (_, expires_at)| *expires_at > now);
        values.insert(key.to_string(), (value.to_vec(), now + ttl));
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError> {
        self.sets
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .sets
            .read()
            .await
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
