//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores and common
//! sync scenarios.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use roadwork_codec::{DocumentRef, Fields, GeoPoint, StoreValue};
use roadwork_store::{Collection, DocumentStore, FileStore, MemoryStore, SYNCHRO_FIELD};
use std::path::Path;
use tempfile::TempDir;

/// Fields holding only `synchro = false`.
pub fn pending_fields() -> Fields {
    let mut fields = Fields::new();
    fields.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(false));
    fields
}

/// Fields holding only `synchro = true`.
pub fn synced_fields() -> Fields {
    let mut fields = Fields::new();
    fields.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(true));
    fields
}

/// A road-works report with every structural value type.
pub fn signalement_fields(index: usize, synchro: bool) -> Fields {
    let created = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).single().expect("valid date")
        + ChronoDuration::minutes(index as i64);
    let offset = (index % 100) as f64 / 1000.0;

    let mut fields = Fields::new();
    fields.insert(
        "description".into(),
        StoreValue::from(format!("Nid de poule #{index}")),
    );
    fields.insert("surface".into(), StoreValue::Double(12.5 + index as f64));
    fields.insert("budget".into(), StoreValue::Integer(150_000 + index as i64));
    fields.insert("date_creation".into(), StoreValue::from(created));
    fields.insert(
        "localisation".into(),
        StoreValue::GeoPoint(GeoPoint::new(-18.91 + offset, 47.52 + offset).expect("valid point")),
    );
    fields.insert(
        "id_entreprise".into(),
        StoreValue::Reference(DocumentRef::new("entreprises", format!("ent{}", index % 3))),
    );
    fields.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(synchro));
    fields
}

/// Inserts `count` pending documents into `collection` and returns their
/// ids, in id order.
pub fn seed_pending<S>(store: &S, collection: Collection, count: usize) -> Vec<String>
where
    S: DocumentStore + ?Sized,
{
    seed(store, collection, count, "pending", pending_fields)
}

/// Inserts `count` synchronized documents into `collection` and returns
/// their ids.
pub fn seed_synced<S>(store: &S, collection: Collection, count: usize) -> Vec<String>
where
    S: DocumentStore + ?Sized,
{
    seed(store, collection, count, "synced", synced_fields)
}

fn seed<S>(
    store: &S,
    collection: Collection,
    count: usize,
    prefix: &str,
    fields: fn() -> Fields,
) -> Vec<String>
where
    S: DocumentStore + ?Sized,
{
    (0..count)
        .map(|i| {
            let id = format!("{prefix}-{i:05}");
            store
                .set(collection, &id, fields())
                .expect("Failed to seed document");
            id
        })
        .collect()
}

/// A file store in a temporary directory, removed on drop.
pub struct TestFileStore {
    /// The store instance.
    pub store: FileStore,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestFileStore {
    /// Creates an empty file store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp_dir.path()).expect("Failed to open file store");
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the store directory.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl Default for TestFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestFileStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with an empty in-memory store.
pub fn with_memory_store<F, R>(f: F) -> R
where
    F: FnOnce(&MemoryStore) -> R,
{
    let store = MemoryStore::new();
    f(&store)
}

/// Runs a test with an empty file store in a temporary directory.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&FileStore, &Path) -> R,
{
    let test_store = TestFileStore::new();
    f(&test_store.store, test_store.path())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use std::collections::BTreeMap;

    /// A store where every collection holds pending, synced and unflagged
    /// documents.
    ///
    /// Returns the store and, per collection, the ids that are pending.
    pub fn mixed_store() -> (MemoryStore, BTreeMap<Collection, Vec<String>>) {
        let store = MemoryStore::new();
        let mut pending = BTreeMap::new();

        for (n, collection) in Collection::ALL.into_iter().enumerate() {
            let ids = seed_pending(&store, collection, n + 1);
            seed_synced(&store, collection, 2);

            let mut unflagged = Fields::new();
            unflagged.insert("nom".into(), StoreValue::from("sans drapeau"));
            store
                .set(collection, "unflagged", unflagged)
                .expect("Failed to seed document");

            pending.insert(collection, ids);
        }

        (store, pending)
    }

    /// A store holding `count` pending reports and as many synced ones.
    pub fn signalements_store(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            store
                .set(
                    Collection::Signalements,
                    &format!("sig-{i:05}"),
                    signalement_fields(i, false),
                )
                .expect("Failed to seed report");
            store
                .set(
                    Collection::Signalements,
                    &format!("old-{i:05}"),
                    signalement_fields(i, true),
                )
                .expect("Failed to seed report");
        }
        store
    }
}
