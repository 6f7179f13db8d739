//! Documents, query filters and write batches.

use crate::collection::Collection;
use roadwork_codec::{Fields, StoreValue};

/// Name of the boolean propagation flag every record carries.
pub const SYNCHRO_FIELD: &str = "synchro";

/// A document read from the store, with its identifier attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Identifier, unique within the collection.
    pub id: String,
    /// Document fields.
    pub fields: Fields,
}

impl Record {
    /// Creates a record.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The `synchro` flag, if present and boolean.
    pub fn synchro(&self) -> Option<bool> {
        self.fields.get(SYNCHRO_FIELD).and_then(StoreValue::as_bool)
    }

    /// True if the record is waiting to be propagated.
    pub fn is_pending(&self) -> bool {
        self.synchro() == Some(false)
    }
}

/// A query predicate over document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// Documents whose `field` is present and equal to `value`.
    Eq {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: StoreValue,
    },
}

impl Filter {
    /// Equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<StoreValue>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `synchro == false`.
    pub fn pending() -> Self {
        Filter::eq(SYNCHRO_FIELD, false)
    }

    /// Evaluates the filter against a document.
    ///
    /// A missing field never matches an equality filter, so documents
    /// without a `synchro` flag are not pending.
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => fields.get(field) == Some(value),
        }
    }
}

/// A merge-update of one existing document.
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    /// Target collection.
    pub collection: Collection,
    /// Target document.
    pub id: String,
    /// Fields to overwrite; other fields are left alone.
    pub changes: Fields,
}

/// A group of updates committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty batch with room for `capacity` writes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            writes: Vec::with_capacity(capacity),
        }
    }

    /// Queues a merge-update.
    pub fn update(&mut self, collection: Collection, id: impl Into<String>, changes: Fields) {
        self.writes.push(Write {
            collection,
            id: id.into(),
            changes,
        });
    }

    /// Queues `synchro = true` for one document.
    pub fn mark_synced(&mut self, collection: Collection, id: impl Into<String>) {
        let mut changes = Fields::new();
        changes.insert(SYNCHRO_FIELD.to_string(), StoreValue::Bool(true));
        self.update(collection, id, changes);
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Queued writes, in order.
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Consumes the batch.
    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(synchro: Option<bool>) -> Fields {
        let mut f = Fields::new();
        f.insert("nom".into(), StoreValue::from("Administrateur"));
        if let Some(s) = synchro {
            f.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(s));
        }
        f
    }

    #[test]
    fn pending_filter() {
        let filter = Filter::pending();
        assert!(filter.matches(&fields(Some(false))));
        assert!(!filter.matches(&fields(Some(true))));
        assert!(!filter.matches(&fields(None)));
        assert!(Filter::All.matches(&fields(None)));
    }

    #[test]
    fn record_flags() {
        assert!(Record::new("r1", fields(Some(false))).is_pending());
        assert!(!Record::new("r1", fields(Some(true))).is_pending());
        assert_eq!(Record::new("r1", fields(None)).synchro(), None);
    }

    #[test]
    fn batch_builder() {
        let mut batch = WriteBatch::with_capacity(2);
        assert!(batch.is_empty());
        batch.mark_synced(Collection::Roles, "r1");
        batch.mark_synced(Collection::Roles, "r2");
        assert_eq!(batch.len(), 2);

        let write = &batch.writes()[0];
        assert_eq!(write.id, "r1");
        assert_eq!(write.changes.get(SYNCHRO_FIELD), Some(&StoreValue::Bool(true)));
    }
}
