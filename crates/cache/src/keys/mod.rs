//! Cache key derivation
//!
//! [`KeyNamespacer`] turns logical keys into the namespaced keys used against
//! the store. [`fingerprint`] derives deterministic logical keys from
//! structured query criteria.

pub mod fingerprint;
pub mod namespace;

pub use fingerprint::{make_key_from_object, strip_criteria};
pub use namespace::{KeyNamespacer, DELIMITER};
