//! Core cache types and structures

use crate::bulk::{BulkScanner, ShardCoordinator};
use crate::config::CacheConfig;
use crate::keys::KeyNamespacer;
use crate::store::KeyValueStore;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::internal::CacheStats;

/// Caching and memoization service over a [`KeyValueStore`]
#[derive(Clone)]
pub struct Cache {
    pub(crate) inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    /// Configuration as given at initialization
    pub config: CacheConfig,
    /// Normalised key prefix
    pub keys: KeyNamespacer,
    /// Client for relative-key commands; routes by key in sharded mode
    pub client: Arc<dyn KeyValueStore>,
    /// Bulk scanner for single-node clear/list
    pub scanner: BulkScanner,
    /// Present in sharded mode
    pub shards: Option<ShardCoordinator>,
    /// Caching toggle consulted by `wrap`
    pub enabled: AtomicBool,
    /// Cleared by `shutdown`
    pub open: AtomicBool,
    /// Statistics
    pub stats: CacheStats,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("key_prefix", &self.inner.keys.prefix())
            .field("store_prefix", &self.inner.client.key_prefix())
            .field("sharded", &self.inner.shards.is_some())
            .field("enabled", &self.is_enabled())
            .field("connected", &self.is_connected())
            .finish()
    }
}
