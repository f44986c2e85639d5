//! Service lifecycle

use crate::bulk::{BulkScanner, ShardCoordinator};
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::keys::KeyNamespacer;
use crate::store::{ClusterTopology, KeyValueStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::internal::CacheStats;
use super::types::{Cache, CacheInner};

impl Cache {
    /// Start a cache against a single store node
    pub fn initialize(config: CacheConfig, client: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::build(config, client, None)
    }

    /// Start a cache against a partitioned store
    ///
    /// `client` serves relative-key commands (it routes by key); `topology`
    /// supplies one client per partition for bulk scans.
    pub fn initialize_sharded(
        config: CacheConfig,
        client: Arc<dyn KeyValueStore>,
        topology: Arc<dyn ClusterTopology>,
    ) -> Result<Self> {
        Self::build(config, client, Some(topology))
    }

    fn build(
        config: CacheConfig,
        client: Arc<dyn KeyValueStore>,
        topology: Option<Arc<dyn ClusterTopology>>,
    ) -> Result<Self> {
        config.validate()?;

        let keys = KeyNamespacer::new(&config.key_prefix, client.key_prefix());
        let scanner = BulkScanner::new(config.scan_batch_size);
        let shards = topology.map(|topology| ShardCoordinator::new(topology, scanner.clone()));

        tracing::info!(
            key_prefix = %keys.prefix(),
            store_prefix = %client.key_prefix(),
            sharded = shards.is_some(),
            enabled = config.enabled,
            "Cache initialized"
        );

        let inner = Arc::new(CacheInner {
            enabled: AtomicBool::new(config.enabled),
            open: AtomicBool::new(true),
            config,
            keys,
            client,
            scanner,
            shards,
            stats: CacheStats::default(),
        });

        Ok(Self { inner })
    }

    /// Stop serving store operations
    ///
    /// Later direct operations fail with `NotConnected` and `wrap` bypasses
    /// the cache. Calling it more than once is harmless.
    pub fn shutdown(&self) {
        if self.inner.open.swap(false, Ordering::SeqCst) {
            let stats = self.statistics();
            tracing::info!(
                hits = stats.hits,
                misses = stats.misses,
                writes = stats.writes,
                "Cache shut down"
            );
        }
    }
}
