//! The result of a successful sync run.

use crate::scanner::SerializedRecord;
use chrono::{DateTime, Utc};
use roadwork_store::Collection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a sync run found and marked.
///
/// Collections with no pending records appear in neither map. Both maps
/// iterate, and serialize, in declared collection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Total records serialized across all collections.
    pub synced: usize,
    /// When the run finished.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Serialized pending records per collection.
    pub data: BTreeMap<Collection, Vec<SerializedRecord>>,
    /// Ids marked as synchronized per collection.
    pub updated: BTreeMap<Collection, Vec<String>>,
}

impl SyncReport {
    /// Returns true if nothing was pending.
    pub fn is_empty(&self) -> bool {
        self.synced == 0
    }

    /// Records found for `collection`, empty if it had none.
    pub fn records(&self, collection: Collection) -> &[SerializedRecord] {
        self.data.get(&collection).map_or(&[], Vec::as_slice)
    }

    /// Ids marked in `collection`, empty if it had none.
    pub fn updated_ids(&self, collection: Collection) -> &[String] {
        self.updated.get(&collection).map_or(&[], Vec::as_slice)
    }
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use roadwork_codec::{format_timestamp, parse_timestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
