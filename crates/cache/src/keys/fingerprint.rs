//! Deterministic keys derived from query criteria
//!
//! The criteria are serialized with `serde_json` in field order, reduced to
//! word characters, and joined to the model identity:
//! `{"chickens":true}` for model `fakemodelname` becomes
//! `fakemodelname:chickenstrue`.

use super::namespace::DELIMITER;
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use serde::Serialize;

/// Residue left behind by a serialized `"where": null` clause
const WHERE_NULL: &str = "wherenull";

/// Derive a logical key from a model identity and criteria object
///
/// Falls back to the bare `prefix` when nothing survives stripping.
pub fn make_key_from_object<T>(prefix: &str, criteria: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let serialized = serde_json::to_string(criteria).map_err(|e| CacheError::Serialization {
        key: prefix.to_string(),
        operation: SerializationOp::Fingerprint,
        source: Box::new(e),
        recovery_hint: RecoveryHint::Manual {
            instructions: "Query criteria must serialize to JSON".to_string(),
        },
    })?;

    let stripped = strip_criteria(&serialized);
    if stripped.is_empty() {
        Ok(prefix.to_string())
    } else {
        Ok(format!("{prefix}{DELIMITER}{stripped}"))
    }
}

/// Keep `[A-Za-z0-9_]` and drop literal `wherenull` runs
pub fn strip_criteria(serialized: &str) -> String {
    let word_chars: String = serialized
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    word_chars.replace(WHERE_NULL, "")
}
