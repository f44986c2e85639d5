//! Value codec between application values and stored strings
//!
//! Strings are stored as-is and numbers as their decimal text, with no JSON
//! envelope. Everything else is stored as JSON. Values that want a custom
//! stored shape implement [`ToPlainValue`].
//!
//! Decoding never fails: text that is not JSON comes back as a string.

use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Conversion to a plain JSON value before caching
///
/// Sequences of implementors convert element-wise.
pub trait ToPlainValue {
    fn to_plain_value(&self) -> Value;
}

impl<T: ToPlainValue> ToPlainValue for [T] {
    fn to_plain_value(&self) -> Value {
        Value::Array(self.iter().map(ToPlainValue::to_plain_value).collect())
    }
}

impl<T: ToPlainValue> ToPlainValue for Vec<T> {
    fn to_plain_value(&self) -> Value {
        self.as_slice().to_plain_value()
    }
}

impl<T: ToPlainValue + ?Sized> ToPlainValue for &T {
    fn to_plain_value(&self) -> Value {
        (**self).to_plain_value()
    }
}

/// Encode a value into its stored form
///
/// Falsy values such as `0`, `false` and `[]` are valid and cached like any
/// other. Only values that serialize to `null`, to an empty string, or not at
/// all are rejected with [`CacheError::InvalidValue`].
pub fn encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    encode_for_key("", value)
}

/// Encode a value after converting it with [`ToPlainValue`]
pub fn encode_plain<T>(value: &T) -> Result<String>
where
    T: ToPlainValue + ?Sized,
{
    encode(&value.to_plain_value())
}

pub(crate) fn encode_for_key<T>(key: &str, value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let serialized =
        serde_json::to_string(value).map_err(|e| CacheError::invalid_value(key, e.to_string()))?;

    if serialized == "null" {
        return Err(CacheError::invalid_value(
            key,
            "value has no serializable form",
        ));
    }

    if serialized.starts_with('"') {
        let text: String = serde_json::from_str(&serialized)
            .map_err(|e| CacheError::invalid_value(key, e.to_string()))?;
        if text.is_empty() {
            return Err(CacheError::invalid_value(key, "value serialized to nothing"));
        }
        return Ok(text);
    }

    Ok(serialized)
}

/// Decode a stored string, falling back to the raw text
pub fn decode(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Decode a stored string into `T`
///
/// Stored text that is not JSON is offered to `T` as a JSON string, so plain
/// strings decode into `String` fields.
pub fn decode_as<T>(raw: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    if let Ok(value) = serde_json::from_str::<T>(raw) {
        return Ok(value);
    }

    serde_json::from_value(Value::String(raw.to_string())).map_err(|e| {
        CacheError::Serialization {
            key: String::new(),
            operation: SerializationOp::Decode,
            source: Box::new(e),
            recovery_hint: RecoveryHint::BypassCache,
        }
    })
}
