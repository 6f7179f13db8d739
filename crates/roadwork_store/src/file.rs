//! File-backed document store.
//!
//! Layout of a store directory:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK                 # Advisory lock for single-process access
//! └─ documents.json       # All collections, rewritten on every change
//! ```
//!
//! Every change is written to `documents.json.tmp`, synced, and renamed over
//! `documents.json`, so a crash leaves either the old or the new file.

use crate::collection::Collection;
use crate::documents::Documents;
use crate::error::{StoreError, StoreResult};
use crate::record::{Filter, Record, WriteBatch};
use crate::store::{DocumentStore, DEFAULT_MAX_BATCH_SIZE};
use fs2::FileExt;
use parking_lot::RwLock;
use roadwork_codec::Fields;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";
const DOCUMENTS_FILE: &str = "documents.json";
const DOCUMENTS_TEMP: &str = "documents.json.tmp";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct StoreFileRef<'a> {
    format_version: u32,
    documents: &'a Documents,
}

#[derive(Deserialize)]
struct StoreFile {
    format_version: u32,
    documents: Documents,
}

/// A document store persisted as a JSON file.
///
/// The whole document set is held in memory; each commit is written out
/// before it becomes visible to readers. Intended for the CLI and for
/// small deployments, not for large datasets.
///
/// # Example
///
/// ```no_run
/// use roadwork_store::{Collection, DocumentStore, FileStore, Filter};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("roadwork-data")).unwrap();
/// let pending = store.query(Collection::Signalements, &Filter::pending()).unwrap();
/// println!("{} pending reports", pending.len());
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    documents: RwLock<Documents>,
    max_batch_size: usize,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path exists and is not a directory
    /// - another process holds the lock (`Locked`)
    /// - the documents file is unreadable or has an unknown format version
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(StoreError::Corrupted(format!(
                "not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let documents = Self::load(&path.join(DOCUMENTS_FILE))?;
        debug!(path = %path.display(), documents = documents.len(), "opened file store");

        Ok(Self {
            path: path.to_path_buf(),
            documents: RwLock::new(documents),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            _lock_file: lock_file,
        })
    }

    /// Sets the largest batch [`DocumentStore::commit`] accepts.
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Returns the store directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents in `collection` matching `filter`.
    pub fn count(&self, collection: Collection, filter: &Filter) -> usize {
        self.documents.read().count(collection, filter)
    }

    fn load(file: &Path) -> StoreResult<Documents> {
        if !file.exists() {
            return Ok(Documents::default());
        }
        let bytes = fs::read(file)?;
        let parsed: StoreFile = serde_json::from_slice(&bytes)?;
        if parsed.format_version != FORMAT_VERSION {
            return Err(StoreError::Corrupted(format!(
                "unsupported format version {}",
                parsed.format_version
            )));
        }
        Ok(parsed.documents)
    }

    fn persist(&self, documents: &Documents) -> StoreResult<()> {
        let temp_path = self.path.join(DOCUMENTS_TEMP);
        let bytes = serde_json::to_vec_pretty(&StoreFileRef {
            format_version: FORMAT_VERSION,
            documents,
        })?;

        let mut temp = File::create(&temp_path)?;
        temp.write_all(&bytes)?;
        temp.sync_all()?;
        fs::rename(&temp_path, self.path.join(DOCUMENTS_FILE))?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn query(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Record>> {
        Ok(self.documents.read().query(collection, filter))
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.documents.read().get(collection, id))
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let mut documents = self.documents.write();
        let mut next = documents.clone();
        next.set(collection, id, fields);
        self.persist(&next)?;
        *documents = next;
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut documents = self.documents.write();
        let mut next = documents.clone();
        next.apply(batch, self.max_batch_size)?;
        self.persist(&next)?;
        *documents = next;
        Ok(())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
