//! End-to-end behaviour of a single-node cache

mod common;

use common::{seed, TestCacheBuilder, MINUTE, TES_KEYS};
use serde_json::json;
use stash_cache::{CacheError, ClearOutcome, ConnectionStatus, SetOutcome};

#[tokio::test]
async fn test_namespaced_keys() {
    let (cache, _) = TestCacheBuilder::new().build();
    assert_eq!(cache.to_key("test"), "cache:test");

    let (cache, _) = TestCacheBuilder::new()
        .with_store_prefix("sails")
        .with_key_prefix("models")
        .build();
    assert_eq!(cache.to_key("test"), ":models:test");
}

#[tokio::test]
async fn test_set_then_get() {
    let (cache, store) = TestCacheBuilder::new().build();

    let outcome = cache.set("test1", "hello1", MINUTE).await.unwrap();
    assert_eq!(outcome, SetOutcome::Stored);
    assert_eq!(outcome.to_string(), "OK");
    assert_eq!(cache.get("test1").await.unwrap(), Some(json!("hello1")));
    assert_eq!(store.keys(), vec!["cache:test1".to_string()]);
}

#[tokio::test]
async fn test_clear_single_node_counts_every_key() {
    let (cache, store) = TestCacheBuilder::new().with_scan_batch_size(3).build();
    seed(&cache, &TES_KEYS).await;
    seed(&cache, &["other", "tex"]).await;

    let outcome = cache.clear("tes").await.unwrap();
    assert_eq!(outcome, ClearOutcome::Single(7));
    assert_eq!(store.len(), 2);

    assert_eq!(cache.clear("tes").await.unwrap(), ClearOutcome::Single(0));
}

#[tokio::test]
async fn test_list_returns_absolute_keys() {
    let (cache, _) = TestCacheBuilder::new().with_store_prefix("app:").build();
    seed(&cache, &["tes", "test1", "zzz"]).await;

    let mut keys = cache.list("tes").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["app:cache:tes", "app:cache:test1"]);
}

#[tokio::test]
async fn test_offline_store_rejects_direct_operations() {
    let (cache, store) = TestCacheBuilder::new().build();
    store.set_status(ConnectionStatus::Closed);

    let results = [
        cache.get("k").await.map(|_| ()),
        cache.set("k", "v", None).await.map(|_| ()),
        cache.del("k").await.map(|_| ()),
        cache.clear("k").await.map(|_| ()),
        cache.list("k").await.map(|_| ()),
    ];

    for result in results {
        match result {
            Err(e @ CacheError::NotConnected { .. }) => {
                assert_eq!(e.to_string(), "store not connected or ready")
            }
            other => panic!("expected NotConnected, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_direct_operations_ignore_toggle() {
    let (cache, _) = TestCacheBuilder::new().with_enabled(false).build();

    cache.set("k", &42, None).await.unwrap();
    assert_eq!(cache.get_as::<u32>("k").await.unwrap(), Some(42));
    assert_eq!(cache.del("k").await.unwrap(), 1);
}

#[tokio::test]
async fn test_statistics_track_lookups() {
    let (cache, _) = TestCacheBuilder::new().build();
    cache.set("k", "v", None).await.unwrap();

    cache.get("k").await.unwrap();
    cache.get("k").await.unwrap();
    cache.get("missing").await.unwrap();

    let stats = cache.statistics();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 200.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_clear_and_list_keys_with_hash_tags() {
    let (cache, store) = TestCacheBuilder::new().build();
    seed(&cache, &["{user42}:profile", "{user42}:settings", "{user7}:profile"]).await;

    let mut keys = cache.list("{user42}").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["cache:{user42}:profile", "cache:{user42}:settings"]);

    assert_eq!(cache.clear("{user42}").await.unwrap(), ClearOutcome::Single(2));
    assert_eq!(store.keys(), vec!["cache:{user7}:profile".to_string()]);

    assert_eq!(cache.clear("{unbalanced").await.unwrap(), ClearOutcome::Single(0));
}
