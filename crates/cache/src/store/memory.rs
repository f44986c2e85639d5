//! In-process store with set-if-absent, expiry and cursor scans

use super::{
    compile_pattern, KeyValueStore, Pipeline, PipelineCommand, ScanCursor, ScanPage, SetOutcome,
    StoreError, StoreResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Connection state reported by [`MemoryStore::is_ready`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Ready,
    Closed,
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

struct MemoryStoreInner {
    endpoint: String,
    prefix: String,
    entries: RwLock<BTreeMap<String, StoredValue>>,
    status: RwLock<ConnectionStatus>,
    injected_failure: RwLock<Option<String>>,
}

/// In-memory [`KeyValueStore`]
///
/// Cloning shares the underlying keyspace.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl MemoryStore {
    /// Create an empty, ready store without a key prefix
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    /// Create an empty, ready store that prefixes relative keys with `prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_endpoint("memory", prefix)
    }

    /// Create a store with a descriptive endpoint name used in error messages
    pub fn with_endpoint(endpoint: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryStoreInner {
                endpoint: endpoint.into(),
                prefix: prefix.into(),
                entries: RwLock::new(BTreeMap::new()),
                status: RwLock::new(ConnectionStatus::Ready),
                injected_failure: RwLock::new(None),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.read()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        *self.inner.status.write() = status;
    }

    /// Make every subsequent command fail with a protocol error
    pub fn inject_failure(&self, message: impl Into<String>) {
        *self.inner.injected_failure.write() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.inner.injected_failure.write() = None;
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .entries
            .read()
            .values()
            .filter(|v| v.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live absolute keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.inner
            .entries
            .read()
            .iter()
            .filter(|(_, v)| v.is_live(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Remaining time-to-live of a relative key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let absolute = self.absolute(key);
        self.inner
            .entries
            .read()
            .get(&absolute)
            .filter(|v| v.is_live(now))
            .and_then(|v| v.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Remove every key
    pub fn flush_all(&self) {
        self.inner.entries.write().clear();
    }

    fn absolute(&self, key: &str) -> String {
        format!("{}{}", self.inner.prefix, key)
    }

    fn check(&self, operation: &'static str) -> StoreResult<()> {
        if let Some(message) = self.inner.injected_failure.read().clone() {
            return Err(StoreError::Protocol { message });
        }

        match self.status() {
            ConnectionStatus::Ready => Ok(()),
            status => Err(StoreError::Connection {
                endpoint: self.inner.endpoint.clone(),
                message: format!("cannot run {operation} while {status:?}"),
            }),
        }
    }

    pub(crate) fn get_absolute(&self, absolute: &str) -> Option<String> {
        let now = Instant::now();
        self.inner
            .entries
            .read()
            .get(absolute)
            .filter(|v| v.is_live(now))
            .map(|v| v.value.clone())
    }

    pub(crate) fn set_if_absent_absolute(
        &self,
        absolute: String,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<SetOutcome> {
        if ttl.is_zero() {
            return Err(StoreError::Protocol {
                message: "invalid expire time in 'set' command".to_string(),
            });
        }

        let now = Instant::now();
        let mut entries = self.inner.entries.write();
        if entries.get(&absolute).is_some_and(|v| v.is_live(now)) {
            return Ok(SetOutcome::Skipped);
        }

        entries.insert(
            absolute,
            StoredValue {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(SetOutcome::Stored)
    }

    pub(crate) fn del_absolute(&self, absolute: &str) -> u64 {
        let now = Instant::now();
        match self.inner.entries.write().remove(absolute) {
            Some(v) if v.is_live(now) => 1,
            _ => 0,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("endpoint", &self.inner.endpoint)
            .field("prefix", &self.inner.prefix)
            .field("status", &self.status())
            .field("entry_count", &self.inner.entries.read().len())
            .finish()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn is_ready(&self) -> bool {
        self.status() == ConnectionStatus::Ready
    }

    fn key_prefix(&self) -> &str {
        &self.inner.prefix
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check("get")?;
        Ok(self.get_absolute(&self.absolute(key)))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<SetOutcome> {
        self.check("set")?;
        self.set_if_absent_absolute(self.absolute(key), value, ttl)
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        self.check("del")?;
        Ok(self.del_absolute(&self.absolute(key)))
    }

    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<u64>> {
        self.check("exec")?;

        let now = Instant::now();
        let mut entries = self.inner.entries.write();
        let replies = pipeline
            .into_commands()
            .into_iter()
            .map(|command| match command {
                PipelineCommand::Del(key) => match entries.remove(&key) {
                    Some(v) if v.is_live(now) => 1,
                    _ => 0,
                },
            })
            .collect();
        Ok(replies)
    }

    async fn scan(
        &self,
        cursor: ScanCursor,
        pattern: &str,
        count: usize,
    ) -> StoreResult<ScanPage> {
        self.check("scan")?;
        let matcher = compile_pattern(pattern)?;

        let now = Instant::now();
        let entries = self.inner.entries.read();
        let lower = match cursor.position() {
            Some(position) => Bound::Excluded(position.to_string()),
            None => Bound::Unbounded,
        };

        let mut examined = entries.range((lower, Bound::Unbounded)).peekable();
        let mut keys = Vec::new();
        let mut last = None;
        for _ in 0..count.max(1) {
            let Some((key, value)) = examined.next() else {
                break;
            };
            if value.is_live(now) && matcher.is_match(key.as_str()) {
                keys.push(key.clone());
            }
            last = Some(key.clone());
        }

        let next = match (examined.peek(), last) {
            (Some(_), Some(position)) => Some(ScanCursor::at(position)),
            _ => None,
        };

        Ok(ScanPage { keys, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scan_all(store: &MemoryStore, pattern: &str, count: usize) -> Vec<String> {
        let mut cursor = ScanCursor::start();
        let mut keys = Vec::new();
        loop {
            let page = store.scan(cursor, pattern, count).await.unwrap();
            keys.extend(page.keys);
            match page.next {
                Some(next) => cursor = next,
                None => break,
            }
        }
        keys
    }

    #[tokio::test]
    async fn test_set_if_absent_does_not_overwrite() {
        let store = MemoryStore::with_prefix("app:");
        let ttl = Duration::from_secs(60);

        assert_eq!(
            store.set_if_absent("k", "v1", ttl).await.unwrap(),
            SetOutcome::Stored
        );
        assert_eq!(
            store.set_if_absent("k", "v2", ttl).await.unwrap(),
            SetOutcome::Skipped
        );
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));
        assert_eq!(store.keys(), vec!["app:k".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_absent() {
        let store = MemoryStore::new();
        store
            .set_if_absent("k", "v1", Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(
            store
                .set_if_absent("k", "v2", Duration::from_secs(5))
                .await
                .unwrap(),
            SetOutcome::Stored
        );
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected() {
        let store = MemoryStore::new();
        let result = store.set_if_absent("k", "v", Duration::ZERO).await;
        assert!(matches!(result, Err(StoreError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_scan_pages_cover_every_match() {
        let store = MemoryStore::with_prefix("p:");
        for i in 0..25 {
            store
                .set_if_absent(&format!("tes{i:02}"), "v", Duration::from_secs(60))
                .await
                .unwrap();
        }
        store
            .set_if_absent("other", "v", Duration::from_secs(60))
            .await
            .unwrap();

        let keys = scan_all(&store, "p:tes*", 4).await;
        assert_eq!(keys.len(), 25);
        assert!(keys.iter().all(|k| k.starts_with("p:tes")));
    }

    #[tokio::test]
    async fn test_scan_survives_deletes_between_pages() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store
                .set_if_absent(&format!("k{i}"), "v", Duration::from_secs(60))
                .await
                .unwrap();
        }

        let page = store.scan(ScanCursor::start(), "k*", 3).await.unwrap();
        let mut pipeline = Pipeline::new();
        for key in &page.keys {
            pipeline.del(key.clone());
        }
        assert_eq!(store.exec(pipeline).await.unwrap(), vec![1, 1, 1]);

        let mut seen = page.keys.len();
        let mut cursor = page.next;
        while let Some(next) = cursor {
            let page = store.scan(next, "k*", 3).await.unwrap();
            seen += page.keys.len();
            cursor = page.next;
        }
        assert_eq!(seen, 10);
    }

    #[tokio::test]
    async fn test_not_ready_store_refuses_commands() {
        let store = MemoryStore::new();
        store.set_status(ConnectionStatus::Connecting);
        assert!(!store.is_ready());
        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new();
        store.inject_failure("READONLY");
        assert!(matches!(store.del("k").await, Err(StoreError::Protocol { .. })));
        store.clear_failure();
        assert_eq!(store.del("k").await.unwrap(), 0);
    }
}
