//! Error constructors and conversions

use super::types::{CacheError, RecoveryHint, SerializationOp};
use crate::store::StoreError;
use std::time::Duration;

impl CacheError {
    /// The store connection is not ready for `operation`
    pub fn not_connected(operation: &'static str) -> Self {
        Self::NotConnected {
            operation,
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_millis(500),
            },
        }
    }

    /// A key was rejected
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Provide a non-empty string key".to_string(),
            },
        }
    }

    /// A value could not be encoded into a non-empty string
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Cache strings, numbers or values with a JSON representation"
                    .to_string(),
            },
        }
    }

    /// Wrap a store client failure for `operation`
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        let recovery_hint = match &source {
            StoreError::Connection { endpoint, .. } => RecoveryHint::CheckNetwork {
                endpoint: endpoint.clone(),
            },
            StoreError::Timeout { .. } => RecoveryHint::RetryWithBackoff {
                initial_delay_ms: 100,
                max_retries: 3,
                backoff_multiplier: 2.0,
            },
            _ => RecoveryHint::NoRecovery,
        };

        Self::Store {
            operation,
            source,
            recovery_hint,
        }
    }

    /// Configuration was rejected
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}

impl From<StoreError> for CacheError {
    fn from(error: StoreError) -> Self {
        Self::store("unknown", error)
    }
}

/// Convert serde_json errors to cache errors
impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            key: String::new(),
            operation: SerializationOp::Decode,
            source: Box::new(error),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check JSON format and data types".to_string(),
            },
        }
    }
}
