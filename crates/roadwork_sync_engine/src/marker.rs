//! Batch marker: flips `synchro` to `true` in bounded atomic chunks.

use crate::config::ensure_within;
use crate::error::{SyncError, SyncResult};
use roadwork_store::{Collection, DocumentStore, WriteBatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of marking one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    /// The marked collection.
    pub collection: Collection,
    /// Records marked.
    pub marked: usize,
    /// Batches committed.
    pub commits: usize,
}

/// Marks records as synchronized.
///
/// Ids are split into consecutive chunks of at most the effective batch
/// size, each committed as one atomic batch, in order. A failed chunk stops
/// the marker; earlier chunks stay committed. A cancel flag, when set, is
/// checked before every chunk.
#[derive(Debug)]
pub struct BatchMarker<'a, S: ?Sized> {
    store: &'a S,
    max_batch_size: usize,
    call_timeout: Option<Duration>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, S: DocumentStore + ?Sized> BatchMarker<'a, S> {
    /// Creates a marker limited to `max_batch_size` writes per batch.
    pub fn new(store: &'a S, max_batch_size: usize) -> Self {
        Self {
            store,
            max_batch_size,
            call_timeout: None,
            cancel: None,
        }
    }

    /// Fails the marker when a commit runs longer than `timeout`.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Stops before the next chunk once `cancel` is set.
    pub fn with_cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Chunk size actually used: the configured size capped by the store.
    pub fn chunk_size(&self) -> usize {
        self.max_batch_size.min(self.store.max_batch_size()).max(1)
    }

    /// Sets `synchro = true` on every id of `collection`.
    ///
    /// An empty id list commits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::BatchCommit`] naming the failed chunk,
    /// [`SyncError::Timeout`] if a commit ran past the call timeout, or
    /// [`SyncError::Cancelled`] if the cancel flag was set.
    pub fn mark(&self, collection: Collection, ids: &[String]) -> SyncResult<MarkOutcome> {
        let chunk_size = self.chunk_size();
        let chunks = ids.len().div_ceil(chunk_size);
        let mut marked = 0;

        for (index, chunk) in ids.chunks(chunk_size).enumerate() {
            if self.is_cancelled() {
                warn!(%collection, chunk = index + 1, chunks, committed = marked, "marking cancelled");
                return Err(SyncError::Cancelled {
                    collection,
                    committed: marked,
                });
            }

            let mut batch = WriteBatch::with_capacity(chunk.len());
            for id in chunk {
                batch.mark_synced(collection, id.as_str());
            }

            let started = Instant::now();
            self.store.commit(batch).map_err(|source| {
                warn!(
                    %collection,
                    chunk = index + 1,
                    chunks,
                    committed = marked,
                    error = %source,
                    "batch commit failed"
                );
                SyncError::BatchCommit {
                    collection,
                    chunk: index + 1,
                    chunks,
                    committed: marked,
                    source,
                }
            })?;
            ensure_within("commit", collection, started, self.call_timeout)?;

            marked += chunk.len();
            debug!(%collection, chunk = index + 1, chunks, size = chunk.len(), "batch committed");
        }

        Ok(MarkOutcome {
            collection,
            marked,
            commits: chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwork_codec::{Fields, StoreValue};
    use roadwork_store::{Filter, MemoryStore};

    fn seed(store: &MemoryStore, collection: Collection, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let id = format!("doc-{i:04}");
                let mut f = Fields::new();
                f.insert("synchro".into(), StoreValue::Bool(false));
                store.set(collection, &id, f).unwrap();
                id
            })
            .collect()
    }

    #[test]
    fn marks_in_chunks() {
        let store = MemoryStore::new();
        let ids = seed(&store, Collection::Signalements, 12);

        let outcome = BatchMarker::new(&store, 5)
            .mark(Collection::Signalements, &ids)
            .unwrap();

        assert_eq!(outcome.marked, 12);
        assert_eq!(outcome.commits, 3);
        assert_eq!(store.commit_count(), 3);
        assert_eq!(store.count(Collection::Signalements, &Filter::pending()), 0);
    }

    #[test]
    fn chunk_size_capped_by_store() {
        let store = MemoryStore::with_max_batch_size(4);
        let ids = seed(&store, Collection::Roles, 10);

        let marker = BatchMarker::new(&store, 500);
        assert_eq!(marker.chunk_size(), 4);
        let outcome = marker.mark(Collection::Roles, &ids).unwrap();
        assert_eq!(outcome.commits, 3);
    }

    #[test]
    fn empty_ids_commit_nothing() {
        let store = MemoryStore::new();
        let outcome = BatchMarker::new(&store, 500)
            .mark(Collection::Roles, &[])
            .unwrap();
        assert_eq!(outcome.marked, 0);
        assert_eq!(outcome.commits, 0);
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn missing_document_fails_its_chunk() {
        let store = MemoryStore::new();
        let mut ids = seed(&store, Collection::Roles, 3);
        ids.push("ghost".into());

        let err = BatchMarker::new(&store, 2)
            .mark(Collection::Roles, &ids)
            .unwrap_err();

        match err {
            SyncError::BatchCommit {
                chunk,
                chunks,
                committed,
                ..
            } => {
                assert_eq!((chunk, chunks, committed), (2, 2, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
        // First chunk stays committed; the second is all-or-nothing.
        assert_eq!(store.count(Collection::Roles, &Filter::pending()), 1);
    }

    #[test]
    fn cancelled_marker_writes_nothing() {
        let store = MemoryStore::new();
        let ids = seed(&store, Collection::Entreprises, 6);
        let cancel = AtomicBool::new(true);

        let err = BatchMarker::new(&store, 2)
            .with_cancel_flag(&cancel)
            .mark(Collection::Entreprises, &ids)
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Cancelled {
                collection: Collection::Entreprises,
                committed: 0
            }
        ));
        assert_eq!(store.commit_count(), 0);
        assert_eq!(store.count(Collection::Entreprises, &Filter::pending()), 6);
    }

    #[test]
    fn unset_flag_does_not_interfere() {
        let store = MemoryStore::new();
        let ids = seed(&store, Collection::Entreprises, 3);
        let cancel = AtomicBool::new(false);

        let outcome = BatchMarker::new(&store, 2)
            .with_cancel_flag(&cancel)
            .mark(Collection::Entreprises, &ids)
            .unwrap();
        assert_eq!(outcome.marked, 3);
    }
}
