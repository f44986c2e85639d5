//! Internal counters for the cache service

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Internal cache statistics with atomic counters
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub writes: AtomicU64,
    pub skipped_writes: AtomicU64,
    pub deletions: AtomicU64,
    pub bypasses: AtomicU64,
    pub errors: AtomicU64,
    pub stats_since: SystemTime,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            skipped_writes: AtomicU64::new(0),
            deletions: AtomicU64::new(0),
            bypasses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            stats_since: SystemTime::now(),
        }
    }
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self, stored: bool) {
        if stored {
            self.writes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.skipped_writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_deletions(&self, count: u64) {
        self.deletions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            skipped_writes: self.skipped_writes.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            stats_since: self.stats_since,
        }
    }
}

/// Point-in-time statistics for a [`crate::Cache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    /// Set-if-absent writes that stored a value
    pub writes: u64,
    /// Set-if-absent writes that found the key already present
    pub skipped_writes: u64,
    pub deletions: u64,
    /// `wrap` calls that ran the computation without consulting the store
    pub bypasses: u64,
    pub errors: u64,
    pub stats_since: SystemTime,
}

impl CacheStatistics {
    /// Hit rate as a percentage of lookups
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            (self.hits as f64 / lookups as f64) * 100.0
        }
    }
}
