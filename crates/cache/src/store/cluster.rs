//! In-process partitioned store
//!
//! Keys are routed to partitions by CRC32C hash slot. A `{tag}` inside a key
//! hashes only the tag, so related keys can be pinned to one partition.

use super::{
    ConnectionStatus, ClusterTopology, KeyValueStore, MemoryStore, PartitionId, Pipeline,
    PipelineCommand, ScanCursor, ScanPage, SetOutcome, StoreError, StoreResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Number of hash slots spread across partitions
pub const HASH_SLOTS: u32 = 16384;

/// A set of [`MemoryStore`] partitions sharing one key prefix
pub struct MemoryCluster {
    prefix: String,
    partitions: Vec<(PartitionId, MemoryStore)>,
    detached: RwLock<HashSet<PartitionId>>,
}

impl MemoryCluster {
    /// Create a cluster with `partitions` empty nodes
    pub fn new(partitions: usize) -> Self {
        Self::with_prefix(partitions, "")
    }

    /// Create a cluster whose nodes prefix relative keys with `prefix`
    pub fn with_prefix(partitions: usize, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let partitions = (0..partitions.max(1))
            .map(|i| {
                let id = PartitionId::new(format!("node-{i}"));
                let store = MemoryStore::with_endpoint(id.as_str(), prefix.clone());
                (id, store)
            })
            .collect();

        Self {
            prefix,
            partitions,
            detached: RwLock::new(HashSet::new()),
        }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Direct access to one partition's store
    pub fn partition(&self, index: usize) -> Option<&MemoryStore> {
        self.partitions.get(index).map(|(_, store)| store)
    }

    /// Index of the partition owning an absolute key
    pub fn partition_index(&self, absolute_key: &str) -> usize {
        let slot = hash_slot(absolute_key) as usize;
        slot * self.partitions.len() / HASH_SLOTS as usize
    }

    /// Make a partition's client lookup return nothing, as for a stale node
    pub fn detach(&self, index: usize) {
        if let Some((id, _)) = self.partitions.get(index) {
            self.detached.write().insert(id.clone());
        }
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        for (_, store) in &self.partitions {
            store.set_status(status);
        }
    }

    /// Remove every key on every partition
    pub fn flush_all(&self) {
        for (_, store) in &self.partitions {
            store.flush_all();
        }
    }

    fn route(&self, absolute_key: &str) -> &MemoryStore {
        &self.partitions[self.partition_index(absolute_key)].1
    }

    fn absolute(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl std::fmt::Debug for MemoryCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCluster")
            .field("prefix", &self.prefix)
            .field("partitions", &self.partitions.len())
            .finish()
    }
}

/// Hash slot of a key, honouring `{tag}` sections
pub fn hash_slot(key: &str) -> u32 {
    let hashed = match key.find('{') {
        Some(open) => match key[open + 1..].find('}') {
            Some(len) if len > 0 => &key[open + 1..open + 1 + len],
            _ => key,
        },
        None => key,
    };
    crc32c::crc32c(hashed.as_bytes()) % HASH_SLOTS
}

#[async_trait]
impl KeyValueStore for MemoryCluster {
    fn is_ready(&self) -> bool {
        self.partitions.iter().all(|(_, store)| store.is_ready())
    }

    fn key_prefix(&self) -> &str {
        &self.prefix
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.route(&self.absolute(key)).get(key).await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<SetOutcome> {
        self.route(&self.absolute(key))
            .set_if_absent(key, value, ttl)
            .await
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        self.route(&self.absolute(key)).del(key).await
    }

    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<u64>> {
        let commands = pipeline.into_commands();
        let mut per_partition: Vec<(Pipeline, Vec<usize>)> =
            vec![(Pipeline::new(), Vec::new()); self.partitions.len()];

        for (position, command) in commands.iter().enumerate() {
            let PipelineCommand::Del(key) = command;
            let (batch, positions) = &mut per_partition[self.partition_index(key)];
            batch.del(key.clone());
            positions.push(position);
        }

        let mut replies = vec![0; commands.len()];
        for ((_, store), (batch, positions)) in self.partitions.iter().zip(per_partition) {
            if batch.is_empty() {
                continue;
            }
            let partition_replies = store.exec(batch).await?;
            for (position, reply) in positions.into_iter().zip(partition_replies) {
                replies[position] = reply;
            }
        }
        Ok(replies)
    }

    async fn scan(
        &self,
        _cursor: ScanCursor,
        _pattern: &str,
        _count: usize,
    ) -> StoreResult<ScanPage> {
        Err(StoreError::Unsupported {
            operation: "scan",
            message: "scans run against individual partitions".to_string(),
        })
    }
}

#[async_trait]
impl ClusterTopology for MemoryCluster {
    async fn writable_partitions(&self) -> StoreResult<Vec<PartitionId>> {
        Ok(self.partitions.iter().map(|(id, _)| id.clone()).collect())
    }

    fn partition_client(&self, id: &PartitionId) -> Option<Arc<dyn KeyValueStore>> {
        if self.detached.read().contains(id) {
            return None;
        }

        self.partitions
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, store)| Arc::new(store.clone()) as Arc<dyn KeyValueStore>)
    }
}
