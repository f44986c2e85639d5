//! Common test utilities and helpers

#![allow(dead_code)]

use stash_cache::{Cache, CacheConfig, CacheConfigBuilder, MemoryCluster, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

/// Builder for test cache instances over in-memory stores
pub struct TestCacheBuilder {
    config: CacheConfigBuilder,
    store_prefix: String,
}

impl TestCacheBuilder {
    pub fn new() -> Self {
        stash_utils::init_for_tests();
        Self {
            config: CacheConfigBuilder::new(),
            store_prefix: String::new(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.config = self.config.with_key_prefix(prefix);
        self
    }

    pub fn with_store_prefix(mut self, prefix: &str) -> Self {
        self.store_prefix = prefix.to_string();
        self
    }

    pub fn with_scan_batch_size(mut self, size: usize) -> Self {
        self.config = self.config.with_scan_batch_size(size);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.config = self.config.with_enabled(enabled);
        self
    }

    fn config(&self) -> CacheConfig {
        self.config.clone().build().unwrap()
    }

    /// Single-node cache and a handle to its store
    pub fn build(self) -> (Cache, MemoryStore) {
        let store = MemoryStore::with_prefix(self.store_prefix.clone());
        let cache = Cache::initialize(self.config(), Arc::new(store.clone())).unwrap();
        (cache, store)
    }

    /// Sharded cache over `partitions` nodes and a handle to the cluster
    pub fn build_sharded(self, partitions: usize) -> (Cache, Arc<MemoryCluster>) {
        let cluster = Arc::new(MemoryCluster::with_prefix(
            partitions,
            self.store_prefix.clone(),
        ));
        let cache =
            Cache::initialize_sharded(self.config(), cluster.clone(), cluster.clone()).unwrap();
        (cache, cluster)
    }
}

impl Default for TestCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub const MINUTE: Option<Duration> = Some(Duration::from_secs(60));

/// Keys sharing the `tes` prefix
pub const TES_KEYS: [&str; 7] = [
    "test1", "test2", "test3", "tes", "testing", "tesla", "test:nested",
];

pub async fn seed(cache: &Cache, keys: &[&str]) {
    for key in keys {
        cache.set(key, &format!("value-{key}"), MINUTE).await.unwrap();
    }
}
