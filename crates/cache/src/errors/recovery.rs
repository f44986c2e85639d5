//! Recovery utilities for cache errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::NotConnected { recovery_hint, .. }
            | Self::InvalidKey { recovery_hint, .. }
            | Self::InvalidValue { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. }
            | Self::Store { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.recovery_hint(),
            RecoveryHint::Retry { .. }
                | RecoveryHint::RetryWithBackoff { .. }
                | RecoveryHint::CheckNetwork { .. }
        )
    }

    /// Check if this error means the store could not be reached
    #[must_use]
    pub const fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_not_connected_is_transient() {
        let err = CacheError::not_connected("get");
        assert!(err.is_transient());
        assert!(err.is_not_connected());
        assert_eq!(err.to_string(), "store not connected or ready");
    }

    #[test]
    fn test_invalid_key_is_not_transient() {
        let err = CacheError::invalid_key("", "wrap requires a valid key name (string)");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "wrap requires a valid key name (string)");
    }

    #[test]
    fn test_store_error_keeps_source() {
        let err = CacheError::store(
            "del",
            StoreError::Connection {
                endpoint: "127.0.0.1:6379".to_string(),
                message: "reset by peer".to_string(),
            },
        );
        assert!(err.is_transient());
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("connection to '127.0.0.1:6379' failed: reset by peer")
        );
    }
}
