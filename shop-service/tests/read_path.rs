//! End-to-end exercises of the cached read path against the in-memory
//! cache backend: corruption self-healing, sweep-at-startup, and the
//! response envelope for degraded reads.
use shop_cache::memory::MemoryCache;
use shop_cache::sweep::{clear_corrupted, SweepGuard};
use shop_cache::{CacheOperations, CORRUPT_SENTINEL};
use shop_service::error::AppError;
use shop_service::services::read_through::read_through;
use shop_service::services::CacheStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn corrupted_entry_reads_as_miss_and_heals() {
    let cache = MemoryCache::new();
    cache
        .insert_raw("product:abc", CORRUPT_SENTINEL)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let calls2 = Arc::clone(&calls);

    let out = read_through(
        &cache,
        "product:abc",
        300,
        TIMEOUT,
        |_: &String| true,
        || async move {
            calls2.fetch_add(1, Ordering::SeqCst);
            Ok("fresh".to_string())
        },
    )
    .await
    .unwrap();

    // The poisoned entry never surfaces; the store was consulted
    assert_eq!(out.status, CacheStatus::Fresh);
    assert_eq!(out.data, "fresh");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    settle().await;
    let raw = cache.get_raw("product:abc").await.unwrap();
    assert_eq!(raw.as_deref(), Some("\"fresh\""));
}

#[tokio::test]
async fn startup_sweep_removes_only_poisoned_keys() {
    let cache = MemoryCache::new();
    cache.insert_raw("cart:user_1", CORRUPT_SENTINEL).await;
    cache.insert_raw("cart:user_2", "{not json").await;
    cache.set("cart:user_3", &vec![1u32], 120).await.unwrap();

    let removed = clear_corrupted(&cache).await.unwrap();
    assert_eq!(removed, 2);
    assert!(!cache.contains("cart:user_1").await);
    assert!(!cache.contains("cart:user_2").await);
    assert!(cache.contains("cart:user_3").await);
}

#[tokio::test]
async fn sweep_guard_runs_exactly_once() {
    let cache = MemoryCache::new();
    cache.insert_raw("bad", CORRUPT_SENTINEL).await;

    let guard = SweepGuard::new();
    guard.ensure(&cache).await;
    assert!(!cache.contains("bad").await);

    // Poison again; a second ensure on the same guard is a no-op
    cache.insert_raw("bad", CORRUPT_SENTINEL).await;
    guard.ensure(&cache).await;
    assert!(cache.contains("bad").await);
}

#[tokio::test]
async fn degraded_read_reports_stale_with_note() {
    let cache = MemoryCache::new();
    let side = cache.clone();

    let out = read_through(
        &cache,
        "reviews:p1",
        600,
        TIMEOUT,
        |_: &Vec<String>| true,
        || async move {
            side.set("reviews:p1", &vec!["ok".to_string()], 600)
                .await
                .unwrap();
            Err::<Vec<String>, _>(AppError::Database("pool exhausted".into()))
        },
    )
    .await
    .unwrap();

    assert_eq!(out.status, CacheStatus::Stale);
    assert!(out.status.is_cached());
    assert!(out.note.is_some());
}
