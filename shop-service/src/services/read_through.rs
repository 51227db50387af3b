//! Generic cache-aside read path
//!
//! Uniform algorithm for every read service: cache hit returns
//! immediately; a miss runs the store query under a bounded timeout
//! and populates the cache on a detached task; a store failure falls
//! back to the last cached value tagged stale, and only reports
//! failure when nothing cached exists.
use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};
use shop_cache::{spawn_set, CacheOperations};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Where the returned data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Straight from the store; cache populated in the background
    Fresh,
    /// Served from cache, store untouched
    Cached,
    /// Served from cache because the store failed
    Stale,
}

impl CacheStatus {
    pub fn is_cached(self) -> bool {
        matches!(self, CacheStatus::Cached | CacheStatus::Stale)
    }
}

/// A read result tagged with its provenance
#[derive(Debug, Clone)]
pub struct CachedPayload<T> {
    pub data: T,
    pub status: CacheStatus,
    /// Explanatory note on degraded (stale) responses
    pub note: Option<&'static str>,
}

const STALE_NOTE: &str = "Using cached data due to temporary issue";

pub async fn read_through<C, T, F, Fut, P>(
    cache: &C,
    key: &str,
    ttl_secs: u64,
    query_timeout: Duration,
    cache_if: P,
    fetch: F,
) -> Result<CachedPayload<T>, AppError>
where
    C: CacheOperations + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    P: Fn(&T) -> bool,
{
    // 1. Cache first; transport errors degrade to a miss.
    match cache.get::<T>(key).await {
        Ok(Some(data)) => {
            return Ok(CachedPayload {
                data,
                status: CacheStatus::Cached,
                note: None,
            });
        }
        Ok(None) => {}
        Err(e) => warn!(key = %key, error = %e, "cache read failed, treating as miss"),
    }

    // 2. Store query with a bound on execution time.
    let fetched = match timeout(query_timeout, fetch()).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Database(format!(
            "store query exceeded {}s",
            query_timeout.as_secs()
        ))),
    };

    match fetched {
        Ok(data) => {
            // 3. Populate after the result is ready to return; the
            //    write never adds latency to the miss path.
            if cache_if(&data) {
                spawn_set(cache, key.to_string(), data.clone(), ttl_secs);
            }
            Ok(CachedPayload {
                data,
                status: CacheStatus::Fresh,
                note: None,
            })
        }
        Err(err) => {
            // 4. Store failed: last cached value, if any, wins.
            if let Ok(Some(data)) = cache.get::<T>(key).await {
                debug!(key = %key, "serving stale cache after store error");
                return Ok(CachedPayload {
                    data,
                    status: CacheStatus::Stale,
                    note: Some(STALE_NOTE),
                });
            }

            match err {
                e @ (AppError::Validation(_) | AppError::NotFound(_)) => Err(e),
                e => Err(AppError::ServiceUnavailable(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_cache::memory::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn settle() {
        // Let the detached populate task run
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn miss_fetches_and_populates() {
        let cache = MemoryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);

        let out = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |_: &Vec<u32>| true,
            || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(vec![1, 2, 3])
            },
        )
        .await
        .unwrap();

        assert_eq!(out.status, CacheStatus::Fresh);
        assert_eq!(out.data, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        settle().await;
        assert!(cache.contains("k").await);
    }

    #[tokio::test]
    async fn hit_skips_the_store_entirely() {
        let cache = MemoryCache::new();
        cache.set("k", &vec![9u32], 300).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);

        let out = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |_: &Vec<u32>| true,
            || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(vec![0])
            },
        )
        .await
        .unwrap();

        assert_eq!(out.status, CacheStatus::Cached);
        assert_eq!(out.data, vec![9]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_error_serves_stale() {
        // The key is empty on the way in; a concurrent writer lands a
        // value while the store call is failing, so the fallback read
        // finds something to serve.
        let cache = MemoryCache::new();
        let side = cache.clone();

        let out = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |_: &Vec<u32>| true,
            || async move {
                side.set("k", &vec![7u32], 300).await.unwrap();
                Err::<Vec<u32>, _>(AppError::Database("connection refused".into()))
            },
        )
        .await
        .unwrap();

        assert_eq!(out.status, CacheStatus::Stale);
        assert_eq!(out.data, vec![7]);
        assert!(out.note.is_some());
    }

    #[tokio::test]
    async fn store_error_without_cache_is_unavailable() {
        let cache = MemoryCache::new();

        let err = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |_: &Vec<u32>| true,
            || async { Err(AppError::Database("down".into())) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn not_found_passes_through_untranslated() {
        let cache = MemoryCache::new();

        let err = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |_: &Vec<u32>| true,
            || async { Err(AppError::NotFound("user not found".into())) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_results_are_not_cached_when_predicate_declines() {
        let cache = MemoryCache::new();

        let out = read_through(
            &cache,
            "k",
            300,
            TIMEOUT,
            |rows: &Vec<u32>| !rows.is_empty(),
            || async { Ok(Vec::<u32>::new()) },
        )
        .await
        .unwrap();

        assert_eq!(out.status, CacheStatus::Fresh);
        settle().await;
        assert!(!cache.contains("k").await);
    }

    #[tokio::test]
    async fn slow_store_times_out_to_unavailable() {
        let cache = MemoryCache::new();

        let err = read_through(
            &cache,
            "k",
            300,
            Duration::from_millis(10),
            |_: &Vec<u32>| true,
            || async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(vec![1])
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
