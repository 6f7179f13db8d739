//! # Roadwork Sync Engine
//!
//! Incremental synchronization for the roadwork document store.
//!
//! This crate provides:
//! - A collection scanner that finds records with `synchro == false`
//! - A batch marker that flips them to `true` in bounded atomic chunks
//! - An orchestrator that runs both phases over the configured collections
//!   and returns a [`SyncReport`]
//!
//! ## Architecture
//!
//! A run is **scan-then-mark**:
//! 1. Scan every collection and serialize its pending records
//! 2. Mark the scanned ids, collection by collection, chunk by chunk
//!
//! ## Key Invariants
//!
//! - A record is marked only if the same run serialized it
//! - Records already synchronized are never read into the payload or written
//! - Each chunk commits atomically; there is no cross-chunk rollback
//! - Re-running after a failure is safe: marking is idempotent
//!
//! ## Example
//!
//! ```rust
//! use roadwork_codec::{Fields, StoreValue};
//! use roadwork_store::{Collection, DocumentStore, MemoryStore};
//! use roadwork_sync_engine::{SyncConfig, SyncEngine};
//!
//! let store = MemoryStore::new();
//! let mut fields = Fields::new();
//! fields.insert("nom".into(), StoreValue::from("Colas"));
//! fields.insert("synchro".into(), StoreValue::Bool(false));
//! store.set(Collection::Entreprises, "e1", fields).unwrap();
//!
//! let engine = SyncEngine::new(SyncConfig::default(), store).unwrap();
//! let report = engine.run_sync().unwrap();
//! assert_eq!(report.synced, 1);
//! assert_eq!(report.updated_ids(Collection::Entreprises), ["e1".to_string()]);
//!
//! // Nothing left to do on the second run.
//! assert!(engine.run_sync().unwrap().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod marker;
mod report;
mod scanner;

pub use config::SyncConfig;
pub use engine::{SyncEngine, SyncState, SyncStats};
pub use error::{SyncError, SyncResult};
pub use marker::{BatchMarker, MarkOutcome};
pub use report::SyncReport;
pub use scanner::{CollectionScanner, ScannedCollection, SerializedRecord};
