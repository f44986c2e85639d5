//! Core error types for the cache system

use crate::store::StoreError;
use std::time::Duration;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The store connection is not in a ready state, or the service was shut down
    NotConnected {
        operation: &'static str,
        recovery_hint: RecoveryHint,
    },

    /// Invalid cache key
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Value has no usable serialized form
    InvalidValue {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Serialization/deserialization errors outside value encoding
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Failure reported by the store client, passed through unchanged
    Store {
        operation: &'static str,
        source: StoreError,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Retry the operation with exponential backoff
    RetryWithBackoff {
        initial_delay_ms: u64,
        max_retries: u32,
        backoff_multiplier: f64,
    },

    /// Verify network connectivity
    CheckNetwork { endpoint: String },

    /// Skip the cache and compute the value directly
    BypassCache,

    /// Update cache configuration
    UpdateConfiguration,

    /// No automated recovery possible
    Manual { instructions: String },

    /// No recovery possible
    NoRecovery,
}

/// Serialization operation types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationOp {
    Decode,
    Fingerprint,
}
