//! Concurrent-edit stress helpers.
//!
//! These drive local edits against a store from several threads, to run
//! alongside sync runs and check that the `synchro` flag ends up consistent.

use roadwork_codec::{Fields, StoreValue};
use roadwork_store::{Collection, DocumentStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Counts of edits performed by a stress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressTestResult {
    /// Edits the store accepted.
    pub successful_ops: usize,
    /// Edits the store rejected.
    pub failed_ops: usize,
}

impl StressTestResult {
    /// All edits attempted.
    pub fn total_ops(&self) -> usize {
        self.successful_ops + self.failed_ops
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of edits to perform.
    pub operations: usize,
    /// Number of concurrent editing threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 2_000,
            threads: 4,
        }
    }
}

/// Edits existing documents from several threads.
///
/// Each edit goes through [`DocumentStore::update`], so it sets a counter
/// field and re-flags the document as pending. Documents are picked round
/// robin from `ids`. Exactly `config.operations` edits are attempted; the
/// last thread takes the remainder of an uneven split.
pub fn stress_concurrent_edits<S>(
    store: Arc<S>,
    collection: Collection,
    ids: Arc<Vec<String>>,
    config: &StressConfig,
) -> StressTestResult
where
    S: DocumentStore + 'static,
{
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let threads = config.threads.max(1);
    let ops_per_thread = config.operations / threads;
    let remainder = config.operations % threads;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let ids = Arc::clone(&ids);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let ops = if t + 1 == threads {
                ops_per_thread + remainder
            } else {
                ops_per_thread
            };

            thread::spawn(move || {
                if ids.is_empty() {
                    return;
                }
                for i in 0..ops {
                    let id = &ids[(t * ops_per_thread + i) % ids.len()];
                    let mut changes = Fields::new();
                    changes.insert("compteur".into(), StoreValue::Integer(i as i64));

                    match store.update(collection, id, changes) {
                        Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult {
        successful_ops: successful.load(Ordering::Relaxed),
        failed_ops: failed.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seed_synced;
    use roadwork_store::{Filter, MemoryStore};

    #[test]
    fn edits_reflag_documents() {
        let store = Arc::new(MemoryStore::new());
        let ids = Arc::new(seed_synced(&*store, Collection::Signalements, 10));

        let result = stress_concurrent_edits(
            Arc::clone(&store),
            Collection::Signalements,
            ids,
            &StressConfig {
                operations: 200,
                threads: 4,
            },
        );

        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200);
        assert_eq!(store.count(Collection::Signalements, &Filter::pending()), 10);
    }

    #[test]
    fn uneven_split_performs_every_edit() {
        let store = Arc::new(MemoryStore::new());
        let ids = Arc::new(seed_synced(&*store, Collection::Roles, 3));

        let result = stress_concurrent_edits(
            Arc::clone(&store),
            Collection::Roles,
            ids,
            &StressConfig {
                operations: 10,
                threads: 4,
            },
        );

        assert_eq!(result.total_ops(), 10);
        assert_eq!(result.successful_ops, 10);
        assert_eq!(store.commit_count(), 10);
    }
}
