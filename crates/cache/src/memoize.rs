//! Memoization of asynchronous computations
//!
//! [`Cache::wrap`] looks the key up first and only runs the computation on a
//! miss, then caches its result with a set-if-absent write. Concurrent calls
//! for the same key are not coordinated: each miss runs its own computation
//! and the first write to land is the one kept.

use crate::core::Cache;
use crate::errors::{CacheError, Result as CacheResult};
use crate::keys::make_key_from_object;
use crate::serialization::decode_as;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// A query whose result can be memoized under a derived key
pub trait CacheableQuery: Send {
    type Output: Serialize + DeserializeOwned + Send;
    type Error: From<CacheError> + Send;
    type Criteria: Serialize + ?Sized;

    /// Identity of the model being queried, used as the key prefix
    fn model_identity(&self) -> Option<&str>;

    /// Criteria that select the query's rows
    fn criteria(&self) -> Option<&Self::Criteria>;

    /// Run the query against its backing source
    fn execute(self) -> BoxFuture<'static, Result<Self::Output, Self::Error>>;
}

/// Key for a query: a non-empty override, else its fingerprint
pub fn make_key_from_query<Q>(query: &Q, key_override: Option<&str>) -> CacheResult<String>
where
    Q: CacheableQuery + ?Sized,
{
    if let Some(key) = key_override.filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }

    let model = query.model_identity().unwrap_or_default();
    match query.criteria() {
        Some(criteria) => make_key_from_object(model, criteria),
        None => make_key_from_object(model, &serde_json::json!({})),
    }
}

impl Cache {
    /// Return the cached value for `key`, or run `computation` and cache it
    ///
    /// The cache is bypassed when `skip_cache` is set, when caching is
    /// disabled, or when the store is not connected. A failed write after the
    /// computation is logged and the computed value is still returned.
    pub async fn wrap<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        skip_cache: bool,
        computation: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if key.is_empty() {
            return Err(
                CacheError::invalid_key(key, "wrap requires a valid key name (string)").into(),
            );
        }

        if skip_cache || !self.is_enabled() {
            self.inner.stats.record_bypass();
            return computation().await;
        }

        if !self.is_connected() {
            tracing::warn!(%key, "Cache store not connected, bypassing cache");
            self.inner.stats.record_bypass();
            return computation().await;
        }

        match self.get_raw(key).await {
            Ok(Some(raw)) if !raw.is_empty() => match decode_as::<T>(&raw) {
                Ok(value) => {
                    self.record_lookup(key, true);
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Discarding undecodable cache entry");
                    self.record_lookup(key, false);
                }
            },
            Ok(_) => self.record_lookup(key, false),
            Err(e) if e.is_not_connected() => {
                tracing::warn!(%key, "Cache store disconnected, bypassing cache");
                self.inner.stats.record_bypass();
                return computation().await;
            }
            Err(e) => return Err(e.into()),
        }

        let value = computation().await?;

        match self.set(key, &value, ttl).await {
            Ok(outcome) => tracing::debug!(%key, %outcome, "Cached computed value"),
            Err(e @ CacheError::InvalidValue { .. }) => {
                tracing::debug!(%key, error = %e, "Computed value not cacheable")
            }
            Err(e) => tracing::warn!(%key, error = %e, "Failed to cache computed value"),
        }

        Ok(value)
    }

    /// Memoize a query under its fingerprint or `key_override`
    pub async fn wrap_query<Q>(
        &self,
        query: Q,
        ttl: Option<Duration>,
        key_override: Option<&str>,
        skip_cache: bool,
    ) -> Result<Q::Output, Q::Error>
    where
        Q: CacheableQuery,
    {
        let key = make_key_from_query(&query, key_override)?;
        self.wrap(&key, ttl, skip_cache, move || query.execute()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::store::{ConnectionStatus, MemoryStore};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FindQuery {
        model: Option<&'static str>,
        criteria: Option<Value>,
        result: Vec<u32>,
        runs: Arc<AtomicUsize>,
    }

    impl CacheableQuery for FindQuery {
        type Output = Vec<u32>;
        type Error = CacheError;
        type Criteria = Value;

        fn model_identity(&self) -> Option<&str> {
            self.model
        }

        fn criteria(&self) -> Option<&Value> {
            self.criteria.as_ref()
        }

        fn execute(self) -> BoxFuture<'static, Result<Vec<u32>, CacheError>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(self.result) })
        }
    }

    fn query(criteria: Option<Value>, runs: &Arc<AtomicUsize>) -> FindQuery {
        FindQuery {
            model: Some("fakemodelname"),
            criteria,
            result: vec![1, 2, 3],
            runs: runs.clone(),
        }
    }

    fn cache(store: &MemoryStore) -> Cache {
        Cache::initialize(CacheConfig::default(), Arc::new(store.clone())).unwrap()
    }

    #[test]
    fn test_make_key_from_query() {
        let runs = Arc::new(AtomicUsize::new(0));

        let q = query(Some(json!({"chickens": true})), &runs);
        assert_eq!(make_key_from_query(&q, None).unwrap(), "fakemodelname:chickenstrue");
        assert_eq!(make_key_from_query(&q, Some("explicit")).unwrap(), "explicit");
        assert_eq!(
            make_key_from_query(&q, Some("")).unwrap(),
            "fakemodelname:chickenstrue"
        );

        let q = query(None, &runs);
        assert_eq!(make_key_from_query(&q, None).unwrap(), "fakemodelname");

        let q = FindQuery {
            model: None,
            ..query(Some(json!({"where": null, "limit": 2})), &runs)
        };
        assert_eq!(make_key_from_query(&q, None).unwrap(), ":limit2");
    }

    #[tokio::test]
    async fn test_wrap_runs_computation_once() {
        let store = MemoryStore::new();
        let cache = cache(&store);

        let first: Result<String, CacheError> = cache
            .wrap("test2", None, false, || async { Ok("hello2".to_string()) })
            .await;
        assert_eq!(first.unwrap(), "hello2");

        let second: Result<String, CacheError> = cache
            .wrap("test2", None, false, || async {
                Err(CacheError::configuration("computation ran on a hit"))
            })
            .await;
        assert_eq!(second.unwrap(), "hello2");
        assert_eq!(store.keys(), vec!["cache:test2".to_string()]);
    }

    #[tokio::test]
    async fn test_wrap_rejects_empty_key() {
        let cache = cache(&MemoryStore::new());
        let err = cache
            .wrap::<u32, CacheError, _, _>("", None, false, || async { Ok(1) })
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::InvalidKey { .. }));
        assert!(err.to_string().contains("wrap requires a valid key name"));
    }

    #[tokio::test]
    async fn test_wrap_bypasses_when_skipped_disabled_or_offline() {
        let store = MemoryStore::new();
        let cache = cache(&store);

        let value: Result<u32, CacheError> = cache.wrap("a", None, true, || async { Ok(1) }).await;
        assert_eq!(value.unwrap(), 1);

        cache.set_enabled(Some(false));
        let value: Result<u32, CacheError> = cache.wrap("b", None, false, || async { Ok(2) }).await;
        assert_eq!(value.unwrap(), 2);
        cache.set_enabled(Some(true));

        store.set_status(ConnectionStatus::Connecting);
        let value: Result<u32, CacheError> = cache.wrap("c", None, false, || async { Ok(3) }).await;
        assert_eq!(value.unwrap(), 3);

        store.set_status(ConnectionStatus::Ready);
        assert!(store.is_empty());
        assert_eq!(cache.statistics().bypasses, 3);
    }

    #[tokio::test]
    async fn test_wrap_computation_error_writes_nothing() {
        let store = MemoryStore::new();
        let cache = cache(&store);

        let err = cache
            .wrap::<u32, CacheError, _, _>("boom", None, false, || async {
                Err(CacheError::configuration("backing query failed"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::Configuration { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_wrap_returns_value_when_write_is_rejected() {
        let store = MemoryStore::new();
        let cache = cache(&store);

        let value: Result<String, CacheError> = cache
            .wrap("empty", None, false, || async { Ok(String::new()) })
            .await;
        assert_eq!(value.unwrap(), "");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_wrap_treats_undecodable_entry_as_miss() {
        let store = MemoryStore::new();
        let cache = cache(&store);
        cache.set("typed", "not a number", None).await.unwrap();

        let value: Result<u32, CacheError> = cache.wrap("typed", None, false, || async { Ok(9) }).await;
        assert_eq!(value.unwrap(), 9);

        let stats = cache.statistics();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_wrap_query_uses_fingerprint() {
        let store = MemoryStore::new();
        let cache = cache(&store);
        let runs = Arc::new(AtomicUsize::new(0));

        let rows = cache
            .wrap_query(query(Some(json!({"chickens": true})), &runs), None, None, false)
            .await
            .unwrap();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(store.keys(), vec!["cache:fakemodelname:chickenstrue".to_string()]);

        let rows = cache
            .wrap_query(query(Some(json!({"chickens": true})), &runs), None, None, false)
            .await
            .unwrap();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
