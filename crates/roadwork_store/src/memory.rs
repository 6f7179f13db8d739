//! In-memory document store.

use crate::collection::Collection;
use crate::documents::Documents;
use crate::error::StoreResult;
use crate::record::{Filter, Record, WriteBatch};
use crate::store::{DocumentStore, DEFAULT_MAX_BATCH_SIZE};
use parking_lot::RwLock;
use roadwork_codec::Fields;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory document store.
///
/// This store keeps all documents in memory and is suitable for:
/// - Unit and integration tests
/// - Embedding the sync engine in a process that owns its data
///
/// # Thread Safety
///
/// The store is thread-safe. A commit holds the write lock for exactly one
/// batch, so concurrent sync runs interleave at batch granularity.
///
/// # Example
///
/// ```rust
/// use roadwork_store::{Collection, DocumentStore, Filter, MemoryStore};
/// use roadwork_codec::{Fields, StoreValue};
///
/// let store = MemoryStore::new();
/// let mut fields = Fields::new();
/// fields.insert("nom".into(), StoreValue::from("Utilisateur"));
/// fields.insert("synchro".into(), StoreValue::Bool(false));
/// store.set(Collection::Roles, "r1", fields).unwrap();
///
/// let pending = store.query(Collection::Roles, &Filter::pending()).unwrap();
/// assert_eq!(pending.len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    documents: RwLock<Documents>,
    max_batch_size: usize,
    commits: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store with the default batch limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_batch_size(DEFAULT_MAX_BATCH_SIZE)
    }

    /// Creates an empty store that rejects batches above `max_batch_size`.
    #[must_use]
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            documents: RwLock::new(Documents::default()),
            max_batch_size,
            commits: AtomicU64::new(0),
        }
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Number of documents in `collection` matching `filter`.
    pub fn count(&self, collection: Collection, filter: &Filter) -> usize {
        self.documents.read().count(collection, filter)
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn query(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Record>> {
        Ok(self.documents.read().query(collection, filter))
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.documents.read().get(collection, id))
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        self.documents.write().set(collection, id, fields);
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        self.documents.write().apply(batch, self.max_batch_size)?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
