//! In-memory [`CacheOperations`] implementation.
//!
//! Used by unit tests and local development without a Redis server.
//! TTLs are recorded but not enforced; the corruption semantics match
//! the Redis client exactly.

use crate::{CacheError, CacheOperations, CacheResult, CORRUPT_SENTINEL};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert raw text, bypassing serialization. Lets tests plant
    /// corrupted entries the way a buggy writer would.
    pub async fn insert_raw(&self, key: &str, raw: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), raw.to_string());
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    // Only the subset of glob the sweeper uses: "*" and "prefix*"
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}

#[async_trait::async_trait]
impl CacheOperations for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut entries = self.entries.lock().await;

        let Some(data) = entries.get(key).cloned() else {
            return Ok(None);
        };

        if data.contains(CORRUPT_SENTINEL) {
            entries.remove(key);
            return Ok(None);
        }

        match serde_json::from_str::<T>(&data) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                entries.remove(key);
                Ok(None)
            }
        }
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        _ttl_secs: u64,
    ) -> CacheResult<()> {
        let data = serde_json::to_string(value).map_err(CacheError::Serialization)?;
        self.entries.lock().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        total: u64,
        rows: Vec<String>,
    }

    #[tokio::test]
    async fn round_trip() {
        let cache = MemoryCache::new();
        let value = Payload {
            total: 2,
            rows: vec!["a".into(), "b".into()],
        };

        cache.set("k", &value, 300).await.unwrap();
        let read: Option<Payload> = cache.get("k").await.unwrap();
        assert_eq!(read, Some(value));
    }

    #[tokio::test]
    async fn corrupted_entry_self_heals() {
        let cache = MemoryCache::new();
        cache.insert_raw("bad", CORRUPT_SENTINEL).await;

        let read: Option<Payload> = cache.get("bad").await.unwrap();
        assert!(read.is_none());
        assert!(!cache.contains("bad").await);
    }

    #[tokio::test]
    async fn invalid_json_self_heals() {
        let cache = MemoryCache::new();
        cache.insert_raw("bad", "{truncated").await;

        let read: Option<serde_json::Value> = cache.get("bad").await.unwrap();
        assert!(read.is_none());
        assert!(!cache.contains("bad").await);
    }

    #[tokio::test]
    async fn keys_glob() {
        let cache = MemoryCache::new();
        cache.insert_raw("cart:user_1", "1").await;
        cache.insert_raw("cart:guest_2", "2").await;
        cache.insert_raw("product:3", "3").await;

        let mut carts = cache.keys("cart:*").await.unwrap();
        carts.sort();
        assert_eq!(carts, vec!["cart:guest_2", "cart:user_1"]);
        assert_eq!(cache.keys("*").await.unwrap().len(), 3);
    }
}
