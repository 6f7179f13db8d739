//! Document store trait definition.

use crate::collection::Collection;
use crate::error::StoreResult;
use crate::record::{Filter, Record, WriteBatch, SYNCHRO_FIELD};
use roadwork_codec::{Fields, StoreValue};
use std::sync::Arc;
use uuid::Uuid;

/// Largest batch a store commits atomically unless it says otherwise.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// A document database partitioned into the fixed [`Collection`] set.
///
/// The sync engine only needs [`query`](Self::query) and
/// [`commit`](Self::commit); the remaining methods serve the collaborators
/// that create and edit records.
///
/// # Invariants
///
/// - `query` is read-only
/// - `commit` applies every write of the batch or none of them
/// - `commit` rejects batches longer than `max_batch_size()`
/// - no transaction spans more than one batch
/// - implementors must be `Send + Sync` for concurrent sync runs
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - for tests and embedding
/// - [`crate::FileStore`] - JSON file on disk
pub trait DocumentStore: Send + Sync {
    /// Returns every document of `collection` matching `filter`.
    ///
    /// No ordering is guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn query(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Record>>;

    /// Fetches one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>>;

    /// Creates or replaces a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()>;

    /// Commits a batch of merge-updates atomically.
    ///
    /// # Errors
    ///
    /// Returns an error, with nothing applied, if the batch is too large,
    /// references a missing document, or cannot be persisted.
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Maximum number of writes [`commit`](Self::commit) accepts.
    fn max_batch_size(&self) -> usize {
        DEFAULT_MAX_BATCH_SIZE
    }

    /// Creates a document under a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let id = auto_id();
        self.set(collection, &id, fields)?;
        Ok(id)
    }

    /// Applies a local edit to an existing document.
    ///
    /// A local edit always flags the document as pending again
    /// (`synchro = false`) so the next sync run propagates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the write fails.
    fn update(&self, collection: Collection, id: &str, mut changes: Fields) -> StoreResult<()> {
        changes.insert(SYNCHRO_FIELD.to_string(), StoreValue::Bool(false));
        let mut batch = WriteBatch::with_capacity(1);
        batch.update(collection, id, changes);
        self.commit(batch)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn query(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Record>> {
        (**self).query(collection, filter)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        (**self).get(collection, id)
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        (**self).set(collection, id, fields)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        (**self).commit(batch)
    }

    fn max_batch_size(&self) -> usize {
        (**self).max_batch_size()
    }

    fn add(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        (**self).add(collection, fields)
    }

    fn update(&self, collection: Collection, id: &str, changes: Fields) -> StoreResult<()> {
        (**self).update(collection, id, changes)
    }
}

/// Generates an identifier for [`DocumentStore::add`].
pub fn auto_id() -> String {
    Uuid::new_v4().simple().to_string()
}
