//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use roadwork_codec::{Fields, StoreValue};
use roadwork_store::{Collection, DocumentStore, MemoryStore};
use roadwork_testkit::signalement_fields;
use std::collections::BTreeMap;

/// Builds a nested map `depth` levels deep with `width` entries per level.
pub fn nested_value(depth: usize, width: usize) -> StoreValue {
    if depth == 0 {
        return StoreValue::from("feuille");
    }
    let entries: BTreeMap<String, StoreValue> = (0..width)
        .map(|i| (format!("key_{i}"), nested_value(depth - 1, width)))
        .collect();
    StoreValue::Map(entries)
}

/// Report fields with `extra` additional text fields.
pub fn wide_signalement(extra: usize) -> Fields {
    let mut fields = signalement_fields(0, false);
    for i in 0..extra {
        fields.insert(format!("note_{i}"), StoreValue::from(format!("observation {i}")));
    }
    fields
}

/// A memory store with `pending` pending and `synced` already-synced reports.
pub fn populated_store(pending: usize, synced: usize) -> MemoryStore {
    let store = MemoryStore::new();
    for i in 0..pending + synced {
        let fields = signalement_fields(i, i >= pending);
        store
            .set(Collection::Signalements, &format!("sig-{i:06}"), fields)
            .expect("memory store write");
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwork_store::Filter;

    #[test]
    fn helpers_build_expected_shapes() {
        match nested_value(2, 3) {
            StoreValue::Map(entries) => assert_eq!(entries.len(), 3),
            other => panic!("expected map, got {other:?}"),
        }
        assert_eq!(wide_signalement(4).len(), signalement_fields(0, false).len() + 4);

        let store = populated_store(5, 2);
        assert_eq!(store.count(Collection::Signalements, &Filter::pending()), 5);
        assert_eq!(store.len(), 7);
    }
}
