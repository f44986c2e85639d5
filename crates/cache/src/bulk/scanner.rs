//! Cursor scans consumed as a stream of key batches

use crate::errors::{CacheError, Result};
use crate::store::{KeyValueStore, Pipeline, ScanCursor, StoreError, StoreResult};
use futures::stream::{self, Stream, TryStreamExt};
use futures::pin_mut;

enum ScanState {
    Start,
    Resume(ScanCursor),
    Done,
}

/// Lazily scan `client` for absolute keys matching `pattern`
///
/// Each item is the batch of keys one round-trip returned. The stream ends
/// when the store reports the scan complete and cannot be restarted.
pub fn key_batches<'a>(
    client: &'a dyn KeyValueStore,
    pattern: &'a str,
    count: usize,
) -> impl Stream<Item = StoreResult<Vec<String>>> + 'a {
    stream::try_unfold(ScanState::Start, move |state| async move {
        let cursor = match state {
            ScanState::Start => ScanCursor::start(),
            ScanState::Resume(cursor) => cursor,
            ScanState::Done => return Ok(None),
        };

        let page = client.scan(cursor, pattern, count).await?;
        let next = match page.next {
            Some(cursor) => ScanState::Resume(cursor),
            None => ScanState::Done,
        };
        Ok::<_, StoreError>(Some((page.keys, next)))
    })
}

/// Deletes or lists keys on a single store node
#[derive(Debug, Clone)]
pub struct BulkScanner {
    batch_size: usize,
}

impl BulkScanner {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delete every key matching `pattern`, one pipeline per batch
    ///
    /// Returns the number of keys submitted for deletion, whatever the store
    /// reports for each one.
    pub async fn scan_delete(&self, client: &dyn KeyValueStore, pattern: &str) -> Result<u64> {
        let batches = key_batches(client, pattern, self.batch_size);
        pin_mut!(batches);

        let mut submitted = 0u64;
        while let Some(keys) = batches
            .try_next()
            .await
            .map_err(|e| CacheError::store("scan", e))?
        {
            if keys.is_empty() {
                continue;
            }

            let mut pipeline = Pipeline::new();
            for key in keys {
                pipeline.del(key);
            }
            submitted += pipeline.len() as u64;

            client
                .exec(pipeline)
                .await
                .map_err(|e| CacheError::store("exec", e))?;
        }

        tracing::debug!(%pattern, submitted, "Scan delete finished");
        Ok(submitted)
    }

    /// Collect every key matching `pattern`
    pub async fn scan_list(&self, client: &dyn KeyValueStore, pattern: &str) -> Result<Vec<String>> {
        let batches = key_batches(client, pattern, self.batch_size);
        pin_mut!(batches);

        let mut keys = Vec::new();
        while let Some(batch) = batches
            .try_next()
            .await
            .map_err(|e| CacheError::store("scan", e))?
        {
            keys.extend(batch);
        }

        tracing::debug!(%pattern, found = keys.len(), "Scan list finished");
        Ok(keys)
    }
}
