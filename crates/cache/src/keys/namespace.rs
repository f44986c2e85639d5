//! Key namespacing

/// Separator between prefix segments and the logical key
pub const DELIMITER: char = ':';

/// Applies the configured module prefix to logical keys
///
/// The prefix is normalised once, at construction:
/// - it gains a leading delimiter when the enclosing store prefix is non-empty
///   and does not already end with one;
/// - it gains a trailing delimiter when missing.
///
/// An empty prefix stays empty and logical keys pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespacer {
    prefix: String,
}

impl KeyNamespacer {
    pub fn new(key_prefix: &str, store_prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(key_prefix, store_prefix),
        }
    }

    /// The normalised module prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully-qualified key, relative to the store prefix
    pub fn to_key(&self, key: &str) -> String {
        let mut namespaced = String::with_capacity(self.prefix.len() + key.len());
        namespaced.push_str(&self.prefix);
        namespaced.push_str(key);
        namespaced
    }

    /// Absolute glob matching every key that starts with `pattern`
    ///
    /// Scans run below the client's own prefixing, so the store prefix is
    /// prepended here.
    pub fn scan_pattern(&self, store_prefix: &str, pattern: &str) -> String {
        format!("{store_prefix}{}*", self.to_key(pattern))
    }
}

/// Normalise a module prefix against the store-level prefix
pub fn normalize_prefix(key_prefix: &str, store_prefix: &str) -> String {
    if key_prefix.is_empty() {
        return String::new();
    }

    let mut prefix = key_prefix.to_string();

    if !prefix.starts_with(DELIMITER)
        && !store_prefix.is_empty()
        && !store_prefix.ends_with(DELIMITER)
    {
        prefix.insert(0, DELIMITER);
    }

    if !prefix.ends_with(DELIMITER) {
        prefix.push(DELIMITER);
    }

    prefix
}
