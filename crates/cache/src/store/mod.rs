//! Contract for the external key-value store
//!
//! The cache never talks to a network client directly. It drives whatever sits
//! behind [`KeyValueStore`], and in sharded deployments discovers partitions
//! through [`ClusterTopology`]. The in-memory implementations in this module
//! back the tests and work for embedding.
//!
//! Keys passed to `get`, `set_if_absent` and `del` are relative to the store's
//! own [`KeyValueStore::key_prefix`]; the store applies that prefix itself.
//! `scan` patterns, the keys `scan` returns and keys queued on a [`Pipeline`]
//! are absolute.

mod cluster;
mod memory;

pub use cluster::MemoryCluster;
pub use memory::{ConnectionStatus, MemoryStore};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result type for store client calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by a store client
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The connection dropped or could not be established
    #[error("connection to '{endpoint}' failed: {message}")]
    Connection { endpoint: String, message: String },

    /// The store did not answer in time
    #[error("store operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: &'static str,
        duration: Duration,
    },

    /// The store rejected the command
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The client cannot perform this command
    #[error("unsupported operation '{operation}': {message}")]
    Unsupported {
        operation: &'static str,
        message: String,
    },

    /// A scan pattern could not be compiled
    #[error("invalid scan pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Acknowledgement of a set-if-absent write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was absent and now holds the value
    Stored,
    /// The key already held a live value; nothing was written
    Skipped,
}

impl SetOutcome {
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Stored)
    }
}

impl fmt::Display for SetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "OK"),
            Self::Skipped => write!(f, "(nil)"),
        }
    }
}

/// Position of a cursor-based key scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCursor(Option<String>);

impl ScanCursor {
    /// Cursor for a fresh scan
    pub fn start() -> Self {
        Self(None)
    }

    /// Cursor resuming after an opaque position token
    pub fn at(position: impl Into<String>) -> Self {
        Self(Some(position.into()))
    }

    /// The position token, `None` at the start of a scan
    pub fn position(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// One round-trip of a key scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Absolute keys matched in this round-trip; may be empty mid-scan
    pub keys: Vec<String>,
    /// Where to continue, `None` once the scan is complete
    pub next: Option<ScanCursor>,
}

/// A command queued on a [`Pipeline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineCommand {
    /// Delete an absolute key
    Del(String),
}

/// Batch of commands executed atomically by [`KeyValueStore::exec`]
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    commands: Vec<PipelineCommand>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue deletion of an absolute key
    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(PipelineCommand::Del(key.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[PipelineCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<PipelineCommand> {
        self.commands
    }
}

/// Client for a single store node (or a routing client for a whole cluster)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Whether the connection is in a ready state
    fn is_ready(&self) -> bool;

    /// Prefix the client applies to relative keys
    fn key_prefix(&self) -> &str;

    /// Read a relative key
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a relative key only if it does not already exist, with an expiry
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> StoreResult<SetOutcome>;

    /// Delete a relative key, returning the number of keys removed
    async fn del(&self, key: &str) -> StoreResult<u64>;

    /// Execute a pipeline atomically, returning one reply per command
    async fn exec(&self, pipeline: Pipeline) -> StoreResult<Vec<u64>>;

    /// Advance a key scan over absolute keys matching a glob `pattern`
    ///
    /// `count` is a hint for how much of the keyspace to examine per call.
    async fn scan(&self, cursor: ScanCursor, pattern: &str, count: usize)
        -> StoreResult<ScanPage>;
}

/// Identifier of one writable store partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Topology of a partitioned store
#[async_trait]
pub trait ClusterTopology: Send + Sync {
    /// Enumerate writable partitions in a stable order
    async fn writable_partitions(&self) -> StoreResult<Vec<PartitionId>>;

    /// Client for one partition, `None` when the partition is stale
    fn partition_client(&self, id: &PartitionId) -> Option<Arc<dyn KeyValueStore>>;
}

/// Compile a store glob pattern (`*`, `?`, `[...]`, `[^...]`, `\` escapes)
///
/// Braces and commas are literal in store patterns, so they are escaped
/// before globset sees them.
pub(crate) fn compile_pattern(pattern: &str) -> StoreResult<globset::GlobMatcher> {
    globset::GlobBuilder::new(&translate_pattern(pattern))
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Rewrite a store glob into globset syntax
fn translate_pattern(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                translated.push('\\');
                if let Some(escaped) = chars.next() {
                    translated.push(escaped);
                }
            }
            '[' if !in_class => {
                in_class = true;
                translated.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    translated.push('!');
                }
            }
            ']' if in_class => {
                in_class = false;
                translated.push(']');
            }
            '{' | '}' | ',' if !in_class => {
                translated.push('\\');
                translated.push(c);
            }
            // globset rejects `**` away from a separator; a run of stars is one star
            '*' if !in_class => {
                translated.push('*');
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
            }
            _ => translated.push(c),
        }
    }

    translated
}
