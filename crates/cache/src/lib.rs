//! Caching and memoization over a remote key-value store
//!
//! This crate provides a caching layer with:
//! - Namespaced keys under a normalised prefix
//! - A value codec that stores primitives as-is and everything else as JSON
//! - Set-if-absent writes with a time-to-live
//! - Memoization of async computations and queries (`wrap`, `wrap_query`)
//! - Bulk listing and deletion by prefix, fanned out across store partitions

pub mod bulk;
pub mod config;
pub mod core;
pub mod errors;
pub mod keys;
pub mod memoize;
pub mod serialization;
pub mod store;

pub use bulk::{BulkScanner, ClearOutcome, ShardCoordinator};
pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigLoader, ConfigSource};
pub use crate::core::{Cache, CacheStatistics};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use keys::{make_key_from_object, KeyNamespacer};
pub use memoize::{make_key_from_query, CacheableQuery};
pub use serialization::{decode, decode_as, encode, encode_plain, ToPlainValue};
pub use store::{
    ClusterTopology, ConnectionStatus, KeyValueStore, MemoryCluster, MemoryStore, PartitionId,
    Pipeline, ScanCursor, ScanPage, SetOutcome, StoreError,
};
