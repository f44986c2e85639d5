//! Concurrent bulk scans across store partitions

use super::scanner::BulkScanner;
use crate::errors::{CacheError, Result};
use crate::store::{ClusterTopology, KeyValueStore, PartitionId};
use std::sync::Arc;

/// Runs [`BulkScanner`] against every writable partition concurrently
///
/// Results come back in partition enumeration order regardless of which
/// partition finishes first. A partition whose client cannot be looked up
/// contributes no entry.
#[derive(Clone)]
pub struct ShardCoordinator {
    topology: Arc<dyn ClusterTopology>,
    scanner: BulkScanner,
}

impl ShardCoordinator {
    pub fn new(topology: Arc<dyn ClusterTopology>, scanner: BulkScanner) -> Self {
        Self { topology, scanner }
    }

    /// Delete matching keys on every partition, one count per partition
    pub async fn clear(&self, pattern: &str) -> Result<Vec<u64>> {
        let clients = self.partition_clients().await?;

        let tasks = clients.iter().map(|(id, client)| async move {
            let deleted = self.scanner.scan_delete(client.as_ref(), pattern).await;
            tracing::debug!(partition = %id, ?deleted, "Partition cleared");
            deleted
        });

        futures::future::join_all(tasks).await.into_iter().collect()
    }

    /// List matching keys on every partition, concatenated in partition order
    pub async fn list(&self, pattern: &str) -> Result<Vec<String>> {
        let clients = self.partition_clients().await?;

        let tasks = clients
            .iter()
            .map(|(_, client)| self.scanner.scan_list(client.as_ref(), pattern));

        let per_partition = futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok(per_partition.concat())
    }

    async fn partition_clients(&self) -> Result<Vec<(PartitionId, Arc<dyn KeyValueStore>)>> {
        let partitions = self
            .topology
            .writable_partitions()
            .await
            .map_err(|e| CacheError::store("partitions", e))?;

        Ok(partitions
            .into_iter()
            .filter_map(|id| match self.topology.partition_client(&id) {
                Some(client) => Some((id, client)),
                None => {
                    tracing::debug!(partition = %id, "Skipping partition without a client");
                    None
                }
            })
            .collect())
    }
}

impl std::fmt::Debug for ShardCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardCoordinator")
            .field("scanner", &self.scanner)
            .finish_non_exhaustive()
    }
}
