//! Collection scanner: finds the pending records of one collection.

use crate::config::ensure_within;
use crate::error::{SyncError, SyncResult};
use roadwork_codec::serialize_record;
use roadwork_store::{Collection, DocumentStore, Filter, Record};
use serde_json::{Map, Value as JsonValue};
use std::time::{Duration, Instant};
use tracing::debug;

/// One serialized record as it appears in the sync payload.
pub type SerializedRecord = Map<String, JsonValue>;

/// The pending records of one collection, captured by a scan.
///
/// `ids` and `records` are index-aligned: `records[i]` is the serialized
/// form of the document whose id is `ids[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedCollection {
    /// The scanned collection.
    pub collection: Collection,
    /// Document ids, used to mark the records afterwards.
    pub ids: Vec<String>,
    /// Serialized records for the payload.
    pub records: Vec<SerializedRecord>,
}

impl ScannedCollection {
    /// Builds the scan result from raw records.
    pub fn from_records(collection: Collection, records: Vec<Record>) -> Self {
        let mut ids = Vec::with_capacity(records.len());
        let mut serialized = Vec::with_capacity(records.len());
        for record in records {
            serialized.push(serialize_record(&record.id, &record.fields));
            ids.push(record.id);
        }
        Self {
            collection,
            ids,
            records: serialized,
        }
    }

    /// Number of records found.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing was pending.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Queries a store for records whose `synchro` flag is `false`.
///
/// Records where the flag is `true` or missing are left alone.
#[derive(Debug)]
pub struct CollectionScanner<'a, S: ?Sized> {
    store: &'a S,
    call_timeout: Option<Duration>,
}

impl<'a, S: DocumentStore + ?Sized> CollectionScanner<'a, S> {
    /// Creates a scanner over `store`.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            call_timeout: None,
        }
    }

    /// Fails scans whose store query runs longer than `timeout`.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Returns every pending record of `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Scan`] if the query fails and
    /// [`SyncError::Timeout`] if it ran past the call timeout.
    pub fn scan(&self, collection: Collection) -> SyncResult<ScannedCollection> {
        let started = Instant::now();
        let records = self
            .store
            .query(collection, &Filter::pending())
            .map_err(|source| SyncError::scan(collection, source))?;
        ensure_within("scan", collection, started, self.call_timeout)?;

        debug!(%collection, pending = records.len(), "scanned collection");
        Ok(ScannedCollection::from_records(collection, records))
    }
}
