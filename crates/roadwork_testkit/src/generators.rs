//! Property-based test generators using proptest.
//!
//! Provides strategies for generating store values and whole datasets that
//! respect the codec's invariants (valid coordinates, timestamps entering
//! values through `StoreValue::from`).

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use roadwork_codec::{DocumentRef, Fields, GeoPoint, StoreValue};
use roadwork_store::{Collection, SYNCHRO_FIELD};
use std::collections::BTreeMap;

/// Strategy for generating collections.
pub fn collection_strategy() -> impl Strategy<Value = Collection> {
    prop::sample::select(Collection::ALL.to_vec())
}

/// Strategy for generating document ids.
pub fn document_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9]{1,20}").expect("Invalid regex")
}

/// Strategy for generating UTC timestamps with nanosecond precision,
/// between 1970 and 2100.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        Utc.timestamp_opt(secs, nanos)
            .single()
            .expect("timestamp in range")
    })
}

/// Strategy for generating valid geographic points.
pub fn geo_point_strategy() -> impl Strategy<Value = GeoPoint> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(lat, lng)| GeoPoint::new(lat, lng).expect("coordinates in range"))
}

/// Strategy for generating document references.
pub fn reference_strategy() -> impl Strategy<Value = DocumentRef> {
    (collection_strategy(), document_id_strategy())
        .prop_map(|(collection, id)| DocumentRef::new(collection.as_str(), id))
}

/// Strategy for generating non-container values.
pub fn leaf_value_strategy() -> impl Strategy<Value = StoreValue> {
    prop_oneof![
        Just(StoreValue::Null),
        any::<bool>().prop_map(StoreValue::Bool),
        any::<i64>().prop_map(StoreValue::Integer),
        prop::num::f64::NORMAL.prop_map(StoreValue::Double),
        "[ -~]{0,24}".prop_map(StoreValue::Text),
        timestamp_strategy().prop_map(StoreValue::from),
        geo_point_strategy().prop_map(StoreValue::GeoPoint),
        reference_strategy().prop_map(StoreValue::Reference),
    ]
}

/// Strategy for generating values, including nested arrays and maps.
pub fn store_value_strategy() -> impl Strategy<Value = StoreValue> {
    leaf_value_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(StoreValue::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4).prop_map(StoreValue::Map),
        ]
    })
}

/// Strategy for generating document fields.
///
/// Field names never collide with `id` or `synchro`; the `synchro` flag is
/// set to `synchro` when given and left out otherwise.
pub fn fields_strategy(synchro: Option<bool>) -> impl Strategy<Value = Fields> {
    prop::collection::btree_map("[a-z_]{1,12}", store_value_strategy(), 0..6).prop_map(
        move |mut fields| {
            fields.remove("id");
            fields.remove(SYNCHRO_FIELD);
            if let Some(flag) = synchro {
                fields.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(flag));
            }
            fields
        },
    )
}

/// A document to seed a store with.
#[derive(Debug, Clone)]
pub struct SeedDocument {
    /// Target collection.
    pub collection: Collection,
    /// Document id.
    pub id: String,
    /// Document fields.
    pub fields: Fields,
}

impl SeedDocument {
    /// Returns true if the document carries `synchro == false`.
    pub fn is_pending(&self) -> bool {
        self.fields.get(SYNCHRO_FIELD) == Some(&StoreValue::Bool(false))
    }
}

/// Strategy for generating a dataset spread over all collections.
///
/// Ids are unique within a collection. Each document is pending, synced or
/// unflagged with roughly equal odds.
pub fn dataset_strategy(max_documents: usize) -> impl Strategy<Value = Vec<SeedDocument>> {
    let flag = prop_oneof![Just(Some(false)), Just(Some(true)), Just(None)];
    prop::collection::btree_map(
        (collection_strategy(), document_id_strategy()),
        flag.prop_flat_map(fields_strategy),
        0..max_documents,
    )
    .prop_map(|documents: BTreeMap<(Collection, String), Fields>| {
        documents
            .into_iter()
            .map(|((collection, id), fields)| SeedDocument {
                collection,
                id,
                fields,
            })
            .collect()
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn stored_timestamps_have_millisecond_precision(ts in timestamp_strategy()) {
            match StoreValue::from(ts) {
                StoreValue::Timestamp(stored) => {
                    prop_assert_eq!(stored.timestamp_subsec_nanos() % 1_000_000, 0);
                    prop_assert!(ts - stored < chrono::Duration::milliseconds(1));
                }
                other => prop_assert!(false, "unexpected value {:?}", other),
            }
        }

        #[test]
        fn fields_respect_flag(fields in fields_strategy(Some(false))) {
            prop_assert_eq!(fields.get(SYNCHRO_FIELD), Some(&StoreValue::Bool(false)));
            prop_assert!(!fields.contains_key("id"));
        }

        #[test]
        fn dataset_ids_unique_per_collection(docs in dataset_strategy(40)) {
            let mut seen = std::collections::BTreeSet::new();
            for doc in &docs {
                prop_assert!(seen.insert((doc.collection, doc.id.clone())));
            }
        }
    }
}
