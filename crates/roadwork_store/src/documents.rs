//! In-memory document table shared by the store backends.

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::record::{Filter, Record, WriteBatch};
use roadwork_codec::Fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All documents, keyed by collection then identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Documents {
    collections: BTreeMap<Collection, BTreeMap<String, Fields>>,
}

impl Documents {
    pub(crate) fn query(&self, collection: Collection, filter: &Filter) -> Vec<Record> {
        self.collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| filter.matches(fields))
                    .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, collection: Collection, filter: &Filter) -> usize {
        self.collections
            .get(&collection)
            .map_or(0, |docs| docs.values().filter(|f| filter.matches(f)).count())
    }

    pub(crate) fn get(&self, collection: Collection, id: &str) -> Option<Record> {
        self.collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Record::new(id, fields.clone()))
    }

    pub(crate) fn set(&mut self, collection: Collection, id: &str, fields: Fields) {
        self.collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Validates the whole batch, then applies it. Nothing is written if
    /// any check fails.
    pub(crate) fn apply(&mut self, batch: WriteBatch, max_batch_size: usize) -> StoreResult<()> {
        if batch.len() > max_batch_size {
            return Err(StoreError::BatchTooLarge {
                size: batch.len(),
                max: max_batch_size,
            });
        }

        if let Some(missing) = batch.writes().iter().find(|w| {
            self.collections
                .get(&w.collection)
                .map_or(true, |docs| !docs.contains_key(&w.id))
        }) {
            return Err(StoreError::not_found(missing.collection, missing.id.clone()));
        }

        for write in batch.into_writes() {
            if let Some(fields) = self
                .collections
                .get_mut(&write.collection)
                .and_then(|docs| docs.get_mut(&write.id))
            {
                fields.extend(write.changes);
            }
        }

        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SYNCHRO_FIELD;
    use roadwork_codec::StoreValue;

    fn doc(synchro: bool) -> Fields {
        let mut f = Fields::new();
        f.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(synchro));
        f
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut docs = Documents::default();
        docs.set(Collection::Roles, "r1", doc(false));

        let mut batch = WriteBatch::new();
        batch.mark_synced(Collection::Roles, "r1");
        batch.mark_synced(Collection::Roles, "ghost");

        let err = docs.apply(batch, 10).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "ghost"));
        assert_eq!(docs.count(Collection::Roles, &Filter::pending()), 1);
    }

    #[test]
    fn apply_rejects_oversized_batch() {
        let mut docs = Documents::default();
        docs.set(Collection::Roles, "r1", doc(false));
        docs.set(Collection::Roles, "r2", doc(false));

        let mut batch = WriteBatch::new();
        batch.mark_synced(Collection::Roles, "r1");
        batch.mark_synced(Collection::Roles, "r2");

        assert!(matches!(
            docs.apply(batch, 1),
            Err(StoreError::BatchTooLarge { size: 2, max: 1 })
        ));
    }

    #[test]
    fn apply_merges_fields() {
        let mut docs = Documents::default();
        let mut fields = doc(false);
        fields.insert("nom".into(), StoreValue::from("Nouveau"));
        docs.set(Collection::StatutsAvancement, "st1", fields);

        let mut batch = WriteBatch::new();
        batch.mark_synced(Collection::StatutsAvancement, "st1");
        docs.apply(batch, 10).unwrap();

        let record = docs.get(Collection::StatutsAvancement, "st1").unwrap();
        assert_eq!(record.synchro(), Some(true));
        assert_eq!(record.fields.get("nom"), Some(&StoreValue::from("Nouveau")));
        assert_eq!(docs.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn apply_commits_whole_batch_or_nothing(
                existing in 1usize..12,
                targets in prop::collection::vec(0usize..16, 0..12),
                max_batch_size in 1usize..10,
            ) {
                let mut docs = Documents::default();
                for i in 0..existing {
                    docs.set(Collection::Roles, &format!("r{i}"), doc(false));
                }
                let before = docs.clone();

                let mut batch = WriteBatch::new();
                for t in &targets {
                    batch.mark_synced(Collection::Roles, format!("r{t}"));
                }

                let valid = targets.len() <= max_batch_size
                    && targets.iter().all(|&t| t < existing);
                let result = docs.apply(batch, max_batch_size);

                prop_assert_eq!(result.is_ok(), valid);
                if valid {
                    for i in 0..existing {
                        let synced = docs
                            .get(Collection::Roles, &format!("r{i}"))
                            .and_then(|r| r.synchro());
                        prop_assert_eq!(synced, Some(targets.contains(&i)));
                    }
                } else {
                    prop_assert_eq!(docs, before);
                }
            }
        }
    }
}
