//! Cache removal and enumeration

use crate::bulk::ClearOutcome;
use crate::errors::Result;

use super::super::types::Cache;

impl Cache {
    /// Delete a single cached key, returning how many keys were removed
    pub async fn del(&self, key: &str) -> Result<u64> {
        self.ensure_connected("del")?;

        let namespaced = self.to_key(key);
        let removed = self
            .inner
            .client
            .del(&namespaced)
            .await
            .map_err(|e| self.store_error("del", e))?;

        self.inner.stats.record_deletions(removed);
        Ok(removed)
    }

    /// Delete every cached key starting with `pattern`
    ///
    /// A single node reports [`ClearOutcome::Single`]; a partitioned store
    /// reports one count per partition as [`ClearOutcome::Sharded`], in
    /// partition enumeration order.
    pub async fn clear(&self, pattern: &str) -> Result<ClearOutcome> {
        self.ensure_connected("clear")?;
        let full_pattern = self.scan_pattern(pattern);

        let outcome = match &self.inner.shards {
            Some(shards) => ClearOutcome::Sharded(shards.clear(&full_pattern).await?),
            None => ClearOutcome::Single(
                self.inner
                    .scanner
                    .scan_delete(self.inner.client.as_ref(), &full_pattern)
                    .await?,
            ),
        };

        self.inner.stats.record_deletions(outcome.total());
        tracing::info!(pattern = %full_pattern, deleted = outcome.total(), "Cache cleared");
        Ok(outcome)
    }

    /// List every stored key starting with `pattern`
    ///
    /// Keys are absolute, as the store holds them. Partitioned stores are
    /// scanned concurrently and concatenated in partition order.
    pub async fn list(&self, pattern: &str) -> Result<Vec<String>> {
        self.ensure_connected("list")?;
        let full_pattern = self.scan_pattern(pattern);

        match &self.inner.shards {
            Some(shards) => shards.list(&full_pattern).await,
            None => {
                self.inner
                    .scanner
                    .scan_list(self.inner.client.as_ref(), &full_pattern)
                    .await
            }
        }
    }

    fn scan_pattern(&self, pattern: &str) -> String {
        self.inner
            .keys
            .scan_pattern(self.inner.client.key_prefix(), pattern)
    }
}
