//! Service-level tests against the in-memory store
