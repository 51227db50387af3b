//! Shared caching layer for the shop backend
//!
//! Provides a consistent cache-aside strategy with:
//! - Interop-frozen key schema (see [`keys`])
//! - Corrupted-entry detection with delete-on-read self-healing
//! - Fire-and-forget population (cache writes never delay responses)
//! - SCAN-based key enumeration for the corruption sweeper

mod error;

pub mod keys;
pub mod memory;
pub mod sweep;

pub use error::{CacheError, CacheResult};
pub use keys::{ttl, CacheKey, ListingPrefix, CATEGORY_TREE_KEY};

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Marker left behind when a JavaScript object was stored without
/// serialization. Entries containing it are unreadable and get purged
/// on the next read. Kept verbatim for interop with cache contents
/// written by the previous implementation.
pub const CORRUPT_SENTINEL: &str = "[object Object]";

/// A raw cache value is corrupted when it carries the sentinel or is
/// not valid JSON text.
pub fn is_corrupted(raw: &str) -> bool {
    raw.contains(CORRUPT_SENTINEL) || serde_json::from_str::<serde_json::Value>(raw).is_err()
}

/// Core cache operations trait
#[async_trait::async_trait]
pub trait CacheOperations: Send + Sync {
    /// Get a value from cache. Corrupted entries are deleted and
    /// reported as a miss.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> CacheResult<()>;

    /// Delete a key from cache
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Get the raw stored text without deserializing (sweeper path)
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Enumerate keys matching a glob pattern (sweeper path)
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

/// Redis-backed cache client
#[derive(Clone)]
pub struct ShopCache {
    redis: SharedRedis,
}

impl ShopCache {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    /// Connect to Redis and wrap the connection manager for sharing.
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(Arc::new(Mutex::new(manager))))
    }

    pub fn shared(&self) -> SharedRedis {
        Arc::clone(&self.redis)
    }

    /// Add jitter to TTL to prevent thundering herd
    fn add_jitter(ttl_secs: u64) -> u64 {
        let jitter_percent = (rand::random::<u32>() % 10) as f64 / 100.0;
        let jitter = (ttl_secs as f64 * jitter_percent).round() as u64;
        ttl_secs + jitter
    }
}

#[async_trait::async_trait]
impl CacheOperations for ShopCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.redis.lock().await;

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => {
                if data.contains(CORRUPT_SENTINEL) {
                    warn!(key = %key, "removing corrupted cache entry");
                    let _ = conn.del::<_, ()>(key).await;
                    return Ok(None);
                }

                match serde_json::from_str::<T>(&data) {
                    Ok(value) => {
                        debug!(key = %key, "cache hit");
                        Ok(Some(value))
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "removing invalid JSON cache entry");
                        let _ = conn.del::<_, ()>(key).await;
                        Ok(None)
                    }
                }
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "redis get error");
                Err(CacheError::Redis(e))
            }
        }
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> CacheResult<()> {
        let data = serde_json::to_string(value).map_err(CacheError::Serialization)?;
        let ttl_with_jitter = Self::add_jitter(ttl_secs);

        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(key, data, ttl_with_jitter)
            .await
            .map_err(CacheError::Redis)?;

        debug!(key = %key, ttl = ttl_with_jitter, "cache set");
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.del::<_, ()>(key).await.map_err(CacheError::Redis)?;

        debug!(key = %key, "cache delete");
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await;
        let result: Option<String> = conn.get(key).await.map_err(CacheError::Redis)?;
        Ok(result)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.redis.lock().await;
        let mut cursor: u64 = 0;
        let mut all_keys = Vec::new();

        loop {
            // SCAN instead of KEYS so a large keyspace never blocks the server
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut *conn)
                .await
                .map_err(CacheError::Redis)?;

            all_keys.extend(keys);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(all_keys)
    }
}

/// Populate the cache on a detached task. Callers on the cache-miss
/// path must not wait for the write; failures are logged and never
/// reach the request.
pub fn spawn_set<C, T>(cache: &C, key: String, value: T, ttl_secs: u64)
where
    C: CacheOperations + Clone + Send + Sync + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let cache = cache.clone();
    tokio::spawn(async move {
        if let Err(e) = cache.set(&key, &value, ttl_secs).await {
            warn!(key = %key, error = %e, "background cache populate failed");
        }
    });
}
