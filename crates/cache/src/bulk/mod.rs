//! Bulk key enumeration and deletion
//!
//! [`BulkScanner`] drives a cursor scan against one store node. The
//! [`ShardCoordinator`] runs it against every writable partition of a
//! partitioned store at once.

mod scanner;
mod shard;

pub use scanner::{key_batches, BulkScanner};
pub use shard::ShardCoordinator;

use serde::{Deserialize, Serialize};

/// Result of [`crate::Cache::clear`]
///
/// The two deployment modes report different shapes and callers that care
/// must match on them. [`ClearOutcome::total`] collapses either into one count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearOutcome {
    /// Keys submitted for deletion on a single store node
    Single(u64),
    /// Keys submitted for deletion per partition, in enumeration order
    Sharded(Vec<u64>),
}

impl ClearOutcome {
    /// Sum of keys submitted for deletion
    pub fn total(&self) -> u64 {
        match self {
            Self::Single(count) => *count,
            Self::Sharded(counts) => counts.iter().sum(),
        }
    }

    pub fn is_sharded(&self) -> bool {
        matches!(self, Self::Sharded(_))
    }
}
