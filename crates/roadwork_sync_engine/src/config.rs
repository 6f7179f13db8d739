//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use roadwork_store::{Collection, DEFAULT_MAX_BATCH_SIZE};
use std::time::{Duration, Instant};

/// Configuration for sync runs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Largest number of records marked in one atomic batch. The effective
    /// chunk size is the smaller of this and the store's own limit.
    pub max_batch_size: usize,
    /// Collections to synchronize, in declared order.
    pub collections: Vec<Collection>,
    /// Upper bound for a single store call. `None` disables the check.
    pub call_timeout: Option<Duration>,
}

impl SyncConfig {
    /// Creates a configuration covering every collection.
    pub fn new() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            collections: Collection::ALL.to_vec(),
            call_timeout: None,
        }
    }

    /// Sets the maximum batch size.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Restricts the run to `collections`. They are put back into declared
    /// order regardless of the order given.
    pub fn with_collections(mut self, collections: impl IntoIterator<Item = Collection>) -> Self {
        self.collections = collections.into_iter().collect();
        self.collections.sort();
        self
    }

    /// Sets the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if the batch size is zero, the
    /// collection list is empty, or a collection appears twice.
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "max_batch_size must be at least 1".into(),
            ));
        }
        if self.collections.is_empty() {
            return Err(SyncError::InvalidConfig("no collections to sync".into()));
        }
        if let Some(pair) = self.collections.windows(2).find(|w| w[0] >= w[1]) {
            return Err(SyncError::InvalidConfig(format!(
                "collection {} listed twice or out of order",
                pair[1]
            )));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails with [`SyncError::Timeout`] if a call started at `started` ran
/// past `limit`.
pub(crate) fn ensure_within(
    operation: &'static str,
    collection: Collection,
    started: Instant,
    limit: Option<Duration>,
) -> SyncResult<()> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let elapsed = started.elapsed();
    if elapsed > limit {
        return Err(SyncError::Timeout {
            operation,
            collection,
            limit,
            elapsed,
        });
    }
    Ok(())
}
