//! Error types for the sync engine.

use roadwork_codec::CodecError;
use roadwork_store::{Collection, StoreError};
use std::time::Duration;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a sync run.
///
/// Every variant is fatal to the run that raised it. The engine never
/// retries; the caller re-runs the whole sync and relies on idempotent
/// marking.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The store could not be queried for a collection. Nothing has been
    /// marked yet when this is raised.
    #[error("scan of {collection} failed: {source}")]
    Scan {
        /// Collection being scanned.
        collection: Collection,
        /// Underlying store fault.
        #[source]
        source: StoreError,
    },

    /// A chunk failed to commit. Chunks before it stay marked.
    #[error(
        "batch commit for {collection} failed at chunk {chunk} of {chunks} \
         ({committed} records already marked): {source}"
    )]
    BatchCommit {
        /// Collection being marked.
        collection: Collection,
        /// 1-based index of the failed chunk.
        chunk: usize,
        /// Total chunks planned for the collection.
        chunks: usize,
        /// Records of this collection durably marked before the failure.
        committed: usize,
        /// Underlying store fault.
        #[source]
        source: StoreError,
    },

    /// A value failed strict validation.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A store call ran longer than the configured call timeout.
    #[error("{operation} on {collection} took {elapsed:?}, limit {limit:?}")]
    Timeout {
        /// `"scan"` or `"commit"`.
        operation: &'static str,
        /// Collection involved.
        collection: Collection,
        /// Configured limit.
        limit: Duration,
        /// Measured duration.
        elapsed: Duration,
    },

    /// The caller cancelled the run. Chunks committed before the
    /// cancellation was seen stay marked; nothing after it is written.
    #[error("sync run cancelled at {collection} ({committed} records already marked)")]
    Cancelled {
        /// Collection the run stopped at.
        collection: Collection,
        /// Records of this collection durably marked before the stop.
        committed: usize,
    },

    /// The configuration cannot be used.
    #[error("invalid sync configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Creates a scan error.
    pub fn scan(collection: Collection, source: StoreError) -> Self {
        Self::Scan { collection, source }
    }

    /// Returns true if re-running the sync may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Scan { .. }
            | SyncError::BatchCommit { .. }
            | SyncError::Timeout { .. }
            | SyncError::Cancelled { .. } => true,
            SyncError::Codec(_) | SyncError::InvalidConfig(_) => false,
        }
    }

    /// The collection the error is about, if any.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            SyncError::Scan { collection, .. }
            | SyncError::BatchCommit { collection, .. }
            | SyncError::Timeout { collection, .. }
            | SyncError::Cancelled { collection, .. } => Some(*collection),
            SyncError::Codec(_) | SyncError::InvalidConfig(_) => None,
        }
    }
}
