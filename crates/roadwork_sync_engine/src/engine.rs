//! Sync orchestrator.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::marker::BatchMarker;
use crate::report::SyncReport;
use crate::scanner::{CollectionScanner, ScannedCollection};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use roadwork_store::{Collection, DocumentStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The phase the most recent run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No run has started yet.
    Idle,
    /// Querying collections for pending records.
    Scanning,
    /// Committing `synchro = true` batches.
    Marking,
    /// The last run completed.
    Synced,
    /// The last run failed.
    Error,
}

impl SyncState {
    /// Returns true while a run is scanning or marking.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Scanning | SyncState::Marking)
    }
}

/// Counters across all runs of an engine.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Runs that completed.
    pub runs_completed: u64,
    /// Runs that failed.
    pub runs_failed: u64,
    /// Records reported as synced by completed runs.
    pub records_synced: u64,
    /// When the last run finished, successfully or not.
    pub last_run: Option<DateTime<Utc>>,
    /// Message of the last failure.
    pub last_error: Option<String>,
}

/// Runs incremental syncs against a document store.
///
/// A run has two phases. First every configured collection is scanned for
/// records with `synchro == false` and serialized; a failed scan aborts the
/// run before anything is written. Then each non-empty collection's ids are
/// marked in chunks. A failed chunk aborts the run and leaves earlier chunks
/// committed; the next run picks up whatever is still pending.
///
/// Records changed between the scan and the mark of the same run are marked
/// with the values the scan saw.
///
/// Runs are not serialized against each other. Two overlapping runs may
/// report the same records.
///
/// A caller that gives up on a run (for example after a request timeout)
/// stops it with [`SyncEngine::run_sync_with_cancel`]: records the caller
/// will never deliver must not be marked.
pub struct SyncEngine<S: DocumentStore> {
    config: SyncConfig,
    store: Arc<S>,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
    active_runs: AtomicUsize,
}

impl<S: DocumentStore> SyncEngine<S> {
    /// Creates an engine owning `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SyncConfig, store: S) -> SyncResult<Self> {
        Self::with_shared_store(config, Arc::new(store))
    }

    /// Creates an engine over a store shared with other components.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if `config` fails validation.
    pub fn with_shared_store(config: SyncConfig, store: Arc<S>) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
            active_runs: AtomicUsize::new(0),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the phase the most recent run reached.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Number of runs in progress.
    pub fn active_runs(&self) -> usize {
        self.active_runs.load(Ordering::SeqCst)
    }

    /// Performs one sync run.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; see [`SyncError`]. Nothing is rolled
    /// back.
    pub fn run_sync(&self) -> SyncResult<SyncReport> {
        self.run_sync_with_cancel(&AtomicBool::new(false))
    }

    /// Performs one sync run that stops once `cancel` is set.
    ///
    /// The flag is checked between scans, between the scan and mark phases,
    /// and before every chunk commit. A chunk already being committed when
    /// the flag is set still lands.
    ///
    /// # Errors
    ///
    /// As [`SyncEngine::run_sync`], plus [`SyncError::Cancelled`].
    pub fn run_sync_with_cancel(&self, cancel: &AtomicBool) -> SyncResult<SyncReport> {
        let _guard = RunGuard::enter(&self.active_runs);
        let started = Instant::now();
        info!(collections = self.config.collections.len(), "sync run started");

        match self.run_phases(cancel) {
            Ok(report) => {
                *self.state.write() = SyncState::Synced;
                let mut stats = self.stats.write();
                stats.runs_completed += 1;
                stats.records_synced += report.synced as u64;
                stats.last_run = Some(report.timestamp);
                info!(
                    synced = report.synced,
                    collections = report.data.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "sync run completed"
                );
                Ok(report)
            }
            Err(err) => {
                *self.state.write() = SyncState::Error;
                let mut stats = self.stats.write();
                stats.runs_failed += 1;
                stats.last_run = Some(Utc::now());
                stats.last_error = Some(err.to_string());
                error!(error = %err, retryable = err.is_retryable(), "sync run failed");
                Err(err)
            }
        }
    }

    fn run_phases(&self, cancel: &AtomicBool) -> SyncResult<SyncReport> {
        *self.state.write() = SyncState::Scanning;
        let scanned = self.scan_all(cancel)?;

        if let Some(first) = scanned.first() {
            check_cancel(cancel, first.collection)?;
        }

        *self.state.write() = SyncState::Marking;
        let updated = self.mark_all(&scanned, cancel)?;

        let synced = scanned.iter().map(ScannedCollection::len).sum();
        let data = scanned
            .into_iter()
            .map(|s| (s.collection, s.records))
            .collect();

        Ok(SyncReport {
            synced,
            timestamp: Utc::now(),
            data,
            updated,
        })
    }

    /// Scans every configured collection, keeping only non-empty results.
    fn scan_all(&self, cancel: &AtomicBool) -> SyncResult<Vec<ScannedCollection>> {
        let scanner =
            CollectionScanner::new(&*self.store).with_call_timeout(self.config.call_timeout);

        let mut scanned = Vec::new();
        for &collection in &self.config.collections {
            check_cancel(cancel, collection)?;
            let result = scanner.scan(collection)?;
            if result.is_empty() {
                debug!(%collection, "nothing pending");
                continue;
            }
            scanned.push(result);
        }
        Ok(scanned)
    }

    fn mark_all(
        &self,
        scanned: &[ScannedCollection],
        cancel: &AtomicBool,
    ) -> SyncResult<BTreeMap<Collection, Vec<String>>> {
        let marker = BatchMarker::new(&*self.store, self.config.max_batch_size)
            .with_call_timeout(self.config.call_timeout)
            .with_cancel_flag(cancel);

        let mut updated = BTreeMap::new();
        for collection in scanned {
            let outcome = marker.mark(collection.collection, &collection.ids)?;
            debug!(
                collection = %outcome.collection,
                marked = outcome.marked,
                commits = outcome.commits,
                "collection marked"
            );
            updated.insert(collection.collection, collection.ids.clone());
        }
        Ok(updated)
    }
}

impl<S: DocumentStore> std::fmt::Debug for SyncEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("active_runs", &self.active_runs())
            .finish_non_exhaustive()
    }
}

fn check_cancel(cancel: &AtomicBool, collection: Collection) -> SyncResult<()> {
    if cancel.load(Ordering::SeqCst) {
        return Err(SyncError::Cancelled {
            collection,
            committed: 0,
        });
    }
    Ok(())
}

struct RunGuard<'a>(&'a AtomicUsize);

impl<'a> RunGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
