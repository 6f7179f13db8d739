//! Fault injection for document stores.

use parking_lot::RwLock;
use roadwork_codec::Fields;
use roadwork_store::{Collection, DocumentStore, Filter, Record, StoreError, StoreResult, WriteBatch};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// A store wrapper that fails or slows down chosen calls.
///
/// Faults are configured through `&self`, so they can be armed after the
/// store has been handed to an engine.
///
/// # Example
///
/// ```rust
/// use roadwork_store::{Collection, DocumentStore, Filter, MemoryStore};
/// use roadwork_testkit::FaultyStore;
///
/// let store = FaultyStore::new(MemoryStore::new());
/// store.fail_scan(Collection::Roles);
/// assert!(store.query(Collection::Roles, &Filter::pending()).is_err());
///
/// store.heal();
/// assert!(store.query(Collection::Roles, &Filter::pending()).is_ok());
/// ```
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    failing_scans: RwLock<BTreeSet<Collection>>,
    failing_commits: RwLock<BTreeSet<u64>>,
    latency: RwLock<Option<Duration>>,
    commit_attempts: AtomicU64,
    batch_sizes: RwLock<Vec<usize>>,
}

impl<S: DocumentStore> FaultyStore<S> {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_scans: RwLock::new(BTreeSet::new()),
            failing_commits: RwLock::new(BTreeSet::new()),
            latency: RwLock::new(None),
            commit_attempts: AtomicU64::new(0),
            batch_sizes: RwLock::new(Vec::new()),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Makes every query on `collection` fail.
    pub fn fail_scan(&self, collection: Collection) {
        self.failing_scans.write().insert(collection);
    }

    /// Makes the `attempt`-th commit fail, counting from 1 across the store's
    /// lifetime.
    pub fn fail_commit(&self, attempt: u64) {
        self.failing_commits.write().insert(attempt);
    }

    /// Sleeps for `latency` before every query and commit.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Clears every armed fault.
    pub fn heal(&self) {
        self.failing_scans.write().clear();
        self.failing_commits.write().clear();
        *self.latency.write() = None;
    }

    /// Commits attempted so far, failed ones included.
    pub fn commit_attempts(&self) -> u64 {
        self.commit_attempts.load(Ordering::SeqCst)
    }

    /// Sizes of every attempted batch, in commit order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.read().clone()
    }

    fn delay(&self) {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            thread::sleep(latency);
        }
    }
}

impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    fn query(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Record>> {
        self.delay();
        if self.failing_scans.read().contains(&collection) {
            return Err(StoreError::backend(format!(
                "injected query fault on {collection}"
            )));
        }
        self.inner.query(collection, filter)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        self.inner.get(collection, id)
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        self.inner.set(collection, id, fields)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let attempt = self.commit_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.batch_sizes.write().push(batch.len());
        self.delay();
        if self.failing_commits.read().contains(&attempt) {
            return Err(StoreError::backend(format!(
                "injected fault on commit {attempt}"
            )));
        }
        self.inner.commit(batch)
    }

    fn max_batch_size(&self) -> usize {
        self.inner.max_batch_size()
    }
}
