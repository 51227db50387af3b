//! Corruption sweeper
//!
//! Scans the whole cache namespace and deletes entries whose raw text
//! is unreadable (sentinel marker or broken JSON). Safe to run
//! repeatedly; [`SweepGuard`] arranges a single run per process at the
//! first read-service invocation.

use crate::{is_corrupted, CacheOperations, CacheResult};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Delete every cache entry whose stored text is corrupted.
/// Returns the number of entries cleared.
pub async fn clear_corrupted<C: CacheOperations>(cache: &C) -> CacheResult<usize> {
    let keys = cache.keys("*").await?;
    let mut cleared = 0usize;

    for key in keys {
        let Some(raw) = cache.get_raw(&key).await? else {
            continue;
        };
        if is_corrupted(&raw) {
            cache.del(&key).await?;
            cleared += 1;
            info!(key = %key, "cleared corrupted cache entry");
        }
    }

    info!(cleared, "corruption sweep finished");
    Ok(cleared)
}

/// Runs the sweep exactly once per process. A failed attempt is
/// logged and retried on the next call; sweep failures are never
/// propagated to the read path that triggered them.
#[derive(Default)]
pub struct SweepGuard {
    done: OnceCell<()>,
}

impl SweepGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ensure<C: CacheOperations>(&self, cache: &C) {
        let result = self
            .done
            .get_or_try_init(|| async {
                clear_corrupted(cache).await.map(|_| ())
            })
            .await;

        if let Err(e) = result {
            warn!(error = %e, "corruption sweep failed, will retry on next read");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;
    use crate::CORRUPT_SENTINEL;

    #[tokio::test]
    async fn sweep_clears_only_corrupted_entries() {
        let cache = MemoryCache::new();
        cache.insert_raw("good", "{\"ok\":true}").await;
        cache.insert_raw("bad1", CORRUPT_SENTINEL).await;
        cache.insert_raw("bad2", "listing: [object Object]").await;
        cache.insert_raw("bad3", "{broken").await;

        let cleared = clear_corrupted(&cache).await.unwrap();
        assert_eq!(cleared, 3);
        assert!(cache.contains("good").await);
        assert!(!cache.contains("bad1").await);
        assert!(!cache.contains("bad2").await);
        assert!(!cache.contains("bad3").await);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let cache = MemoryCache::new();
        cache.insert_raw("bad", CORRUPT_SENTINEL).await;

        assert_eq!(clear_corrupted(&cache).await.unwrap(), 1);
        assert_eq!(clear_corrupted(&cache).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn guard_runs_once() {
        let cache = MemoryCache::new();
        cache.insert_raw("bad", CORRUPT_SENTINEL).await;

        let guard = SweepGuard::new();
        guard.ensure(&cache).await;
        assert!(!cache.contains("bad").await);

        // A later corrupted write is left for the delete-on-read path.
        cache.insert_raw("bad2", CORRUPT_SENTINEL).await;
        guard.ensure(&cache).await;
        assert!(cache.contains("bad2").await);
    }
}
