//! The cache service
//!
//! [`Cache`] owns the namespacing rules, the caching toggle and the handles to
//! the store. It is cheap to clone and safe to share across tasks.

pub mod internal;

mod builder;
mod operations;
mod types;

pub use internal::CacheStatistics;
pub use types::Cache;

#[cfg(test)]
mod tests;
