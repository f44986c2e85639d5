//! Cache operations
//!
//! Every direct store operation checks connectivity first and fails with
//! `NotConnected` before any round-trip.

mod get;
mod put;
mod remove;

use crate::errors::{CacheError, Result};
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::internal::CacheStatistics;
use super::types::Cache;

impl Cache {
    /// Namespaced key for a logical key
    pub fn to_key(&self, key: &str) -> String {
        self.inner.keys.to_key(key)
    }

    /// The normalised key prefix
    pub fn key_prefix(&self) -> &str {
        self.inner.keys.prefix()
    }

    pub fn config(&self) -> &crate::config::CacheConfig {
        &self.inner.config
    }

    pub fn is_sharded(&self) -> bool {
        self.inner.shards.is_some()
    }

    /// Whether the service is open and the store connection is ready
    pub fn is_connected(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst) && self.inner.client.is_ready()
    }

    /// Set the caching toggle used by `wrap`, or invert it when `None`
    ///
    /// Returns the new state. Direct `get`/`set`/`del` are unaffected.
    pub fn set_enabled(&self, enabled: Option<bool>) -> bool {
        match enabled {
            Some(value) => {
                self.inner.enabled.store(value, Ordering::SeqCst);
                value
            }
            None => !self.inner.enabled.fetch_xor(true, Ordering::SeqCst),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Snapshot of the service counters
    pub fn statistics(&self) -> CacheStatistics {
        self.inner.stats.snapshot()
    }

    pub(crate) fn ensure_connected(&self, operation: &'static str) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(CacheError::not_connected(operation))
        }
    }

    /// TTL for a write: an explicit non-zero TTL, else the configured default
    pub(crate) fn resolve_ttl(&self, ttl: Option<Duration>) -> Duration {
        ttl.filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.inner.config.default_ttl)
    }

    pub(crate) fn store_error(
        &self,
        operation: &'static str,
        source: crate::store::StoreError,
    ) -> CacheError {
        self.inner.stats.record_error();
        CacheError::store(operation, source)
    }
}
