//! Error types for store operations.

use crate::collection::Collection;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted document file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A collection name outside the fixed set.
    #[error("unknown collection: {0:?}")]
    UnknownCollection(String),

    /// An update referenced a document that does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        /// Collection searched.
        collection: Collection,
        /// Missing document identifier.
        id: String,
    },

    /// A write batch exceeded the store's atomic batch limit.
    #[error("write batch of {size} operations exceeds the limit of {max}")]
    BatchTooLarge {
        /// Operations in the rejected batch.
        size: usize,
        /// Maximum the store accepts.
        max: usize,
    },

    /// Another process holds the store lock.
    #[error("store is locked by another process")]
    Locked,

    /// The persisted store is unreadable.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// No free integer identifier was found.
    #[error("no free integer id in {collection} after {attempts} attempts")]
    IdSpaceExhausted {
        /// Collection the id was drawn for.
        collection: Collection,
        /// Candidates tried.
        attempts: u32,
    },

    /// Failure reported by a remote or wrapped backend.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::not_found(Collection::Signalements, "s1");
        assert_eq!(err.to_string(), "document signalements/s1 not found");

        let err = StoreError::BatchTooLarge { size: 501, max: 500 };
        assert!(err.to_string().contains("501"));
        assert!(err.to_string().contains("500"));
    }
}
