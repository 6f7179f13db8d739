//! # Roadwork Store
//!
//! Document-store interface and backends for the roadwork sync engine.
//!
//! The data model is a fixed set of eight [`Collection`]s holding
//! [`Record`]s: an identifier plus a field map of
//! [`roadwork_codec::StoreValue`]s. Every record carries a boolean
//! `synchro` flag; `false` means "changed locally, not yet propagated".
//!
//! ## Design Principles
//!
//! - The sync engine needs only `query` and `commit`
//! - A commit is atomic for one batch and never spans batches
//! - Batches larger than the store's limit are rejected, not split
//! - Local edits go through [`DocumentStore::update`], which re-flags the
//!   record as pending
//!
//! ## Available Backends
//!
//! - [`MemoryStore`] - for testing and embedding
//! - [`FileStore`] - JSON file on disk, used by the CLI
//!
//! ## Example
//!
//! ```rust
//! use roadwork_store::{Collection, DocumentStore, Filter, MemoryStore, WriteBatch};
//! use roadwork_codec::{Fields, StoreValue};
//!
//! let store = MemoryStore::new();
//! let mut fields = Fields::new();
//! fields.insert("synchro".into(), StoreValue::Bool(false));
//! store.set(Collection::Parametres, "1", fields).unwrap();
//!
//! let mut batch = WriteBatch::new();
//! batch.mark_synced(Collection::Parametres, "1");
//! store.commit(batch).unwrap();
//!
//! assert!(store.query(Collection::Parametres, &Filter::pending()).unwrap().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod documents;
mod error;
mod file;
mod id;
mod memory;
mod record;
mod store;

pub use collection::Collection;
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use id::{block_user, generate_unique_int_id, MAX_INT_ID, MIN_INT_ID};
pub use memory::MemoryStore;
pub use record::{Filter, Record, Write, WriteBatch, SYNCHRO_FIELD};
pub use store::{auto_id, DocumentStore, DEFAULT_MAX_BATCH_SIZE};
