//! Cache get operations

use crate::errors::Result;
use crate::serialization::{decode, decode_as};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::super::types::Cache;

impl Cache {
    /// Read a cached value, `None` when the key is missing
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = self.get_raw(key).await?;
        self.record_lookup(key, raw.is_some());
        Ok(raw.map(|raw| decode(&raw)))
    }

    /// Read a cached value as `T`
    pub async fn get_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let raw = self.get_raw(key).await?;
        self.record_lookup(key, raw.is_some());
        match raw {
            Some(raw) => decode_as(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Read the stored string for a logical key
    ///
    /// Hit and miss accounting is left to the caller, which knows whether
    /// the stored value was usable.
    pub(crate) async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.ensure_connected("get")?;

        self.inner
            .client
            .get(&self.to_key(key))
            .await
            .map_err(|e| self.store_error("get", e))
    }

    pub(crate) fn record_lookup(&self, key: &str, hit: bool) {
        if hit {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }
        stash_utils::logging::cache_event(key, hit, "get");
    }
}
