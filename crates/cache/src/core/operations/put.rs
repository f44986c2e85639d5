//! Cache set operations

use crate::errors::Result;
use crate::serialization::{encode_for_key, ToPlainValue};
use crate::store::SetOutcome;
use serde::Serialize;
use std::time::Duration;

use super::super::types::Cache;

impl Cache {
    /// Cache a value unless the key already holds one
    ///
    /// The write is set-if-absent with an expiry: an existing live entry is
    /// never overwritten and the call reports [`SetOutcome::Skipped`].
    /// `ttl` of `None` or zero uses the configured default.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<SetOutcome>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_connected("set")?;
        let encoded = encode_for_key(key, value)?;
        self.set_encoded(key, &encoded, ttl).await
    }

    /// Cache a value through its [`ToPlainValue`] conversion
    pub async fn set_plain<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome>
    where
        T: ToPlainValue + ?Sized,
    {
        self.ensure_connected("set")?;
        let encoded = encode_for_key(key, &value.to_plain_value())?;
        self.set_encoded(key, &encoded, ttl).await
    }

    async fn set_encoded(
        &self,
        key: &str,
        encoded: &str,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome> {
        let ttl = self.resolve_ttl(ttl);
        let namespaced = self.to_key(key);

        let outcome = self
            .inner
            .client
            .set_if_absent(&namespaced, encoded, ttl)
            .await
            .map_err(|e| self.store_error("set", e))?;

        self.inner.stats.record_write(outcome.is_stored());
        tracing::debug!(key = %namespaced, ttl_secs = ttl.as_secs(), %outcome, "Cache set");
        Ok(outcome)
    }
}
