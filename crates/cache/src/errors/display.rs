//! Display implementations for cache errors

use super::types::CacheError;
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected { .. } => write!(f, "store not connected or ready"),
            Self::InvalidKey { key, reason, .. } => {
                if key.is_empty() {
                    write!(f, "{reason}")
                } else {
                    write!(f, "invalid cache key '{key}': {reason}")
                }
            }
            Self::InvalidValue { key, reason, .. } => write!(
                f,
                "invalid data type provided for cache set of '{key}': {reason}"
            ),
            Self::Serialization {
                key,
                operation,
                source,
                ..
            } => write!(f, "failed to {operation:?} '{key}': {source}"),
            Self::Store {
                operation, source, ..
            } => write!(f, "store error during {operation}: {source}"),
            Self::Configuration { message, .. } => {
                write!(f, "cache configuration error: {message}")
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization { source, .. } => Some(source.as_ref()),
            Self::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}
