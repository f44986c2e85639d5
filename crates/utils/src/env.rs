//! Typed access to environment variables
//!
//! Unset or empty variables read as `None`. Values that are present but do not
//! parse are reported with the variable name so configuration errors point at
//! the right place.

use std::fmt;
use std::str::FromStr;

/// A variable was set but could not be parsed into the requested type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvParseError {
    pub variable: String,
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "environment variable '{}' has value '{}', expected {}",
            self.variable, self.value, self.expected
        )
    }
}

impl std::error::Error for EnvParseError {}

/// Read a non-empty string variable
pub fn env_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Read and parse a variable with `FromStr`
pub fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = env_string(name) else {
        return Ok(None);
    };

    raw.trim().parse::<T>().map(Some).map_err(|_| EnvParseError {
        variable: name.to_string(),
        value: raw,
        expected: std::any::type_name::<T>(),
    })
}

/// Read a boolean flag
///
/// Accepts `1/0`, `true/false`, `yes/no` and `on/off`, case-insensitively.
pub fn env_flag(name: &str) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = env_string(name) else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError {
            variable: name.to_string(),
            value: raw,
            expected: "a boolean flag",
        }),
    }
}
