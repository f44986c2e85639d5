//! Shared utilities for stash
//!
//! This crate provides the ambient pieces used across the workspace:
//! tracing subscriber setup and typed environment-variable parsing.

pub mod env;
pub mod logging;

pub use env::*;
pub use logging::{init, init_for_tests};
