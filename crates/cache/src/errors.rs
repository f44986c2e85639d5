//! Error handling for the cache system
//!
//! Every variant carries a [`RecoveryHint`] so callers can decide whether a
//! failed operation is worth retrying, bypassing or surfacing.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
