//! Integration tests for sync runs against real and faulty stores.

use roadwork_codec::{serialize_record, Fields};
use roadwork_store::{Collection, DocumentStore, FileStore, Filter, MemoryStore, Record};
use roadwork_sync_engine::{SyncConfig, SyncEngine, SyncError, SyncState};
use roadwork_testkit::prelude::*;
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn faulty_engine(config: SyncConfig) -> SyncEngine<FaultyStore<MemoryStore>> {
    SyncEngine::new(config, FaultyStore::new(MemoryStore::new())).unwrap()
}

#[test]
fn second_run_finds_nothing() {
    let engine = faulty_engine(SyncConfig::default());
    seed_pending(engine.store(), Collection::Signalements, 5);

    let first = engine.run_sync().unwrap();
    assert_eq!(first.synced, 5);
    let commits_after_first = engine.store().commit_attempts();

    let second = engine.run_sync().unwrap();
    assert!(second.is_empty());
    assert!(second.data.is_empty());
    assert_eq!(engine.store().commit_attempts(), commits_after_first);
}

/// Documents that must come out of a run untouched.
fn bystanders(store: &MemoryStore) -> Vec<Record> {
    Collection::ALL
        .iter()
        .flat_map(|&c| {
            ["synced-00000", "synced-00001", "unflagged"]
                .into_iter()
                .filter_map(move |id| store.get(c, id).unwrap())
        })
        .collect()
}

#[test]
fn marks_exactly_the_pending_records() {
    let (store, pending) = scenarios::mixed_store();
    let before = bystanders(&store);
    assert_eq!(before.len(), 24);

    let engine = SyncEngine::new(SyncConfig::default(), store).unwrap();
    let report = engine.run_sync().unwrap();

    assert_eq!(report.updated, pending);
    assert_eq!(report.synced, pending.values().map(Vec::len).sum::<usize>());
    for (collection, records) in &report.data {
        let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, pending[collection]);
    }

    for collection in Collection::ALL {
        assert_eq!(engine.store().count(collection, &Filter::pending()), 0);
    }
    assert_eq!(bystanders(engine.store()), before);
}

#[test]
fn payload_uses_portable_encodings() {
    let store = scenarios::signalements_store(2);
    let engine = SyncEngine::new(SyncConfig::default(), store).unwrap();
    let report = engine.run_sync().unwrap();

    let records = report.records(Collection::Signalements);
    assert_eq!(records.len(), 2);
    let first = &records[0];
    assert_eq!(first["id"], "sig-00000");
    assert_eq!(first["date_creation"], "2024-01-15T08:00:00.000Z");
    assert_eq!(first["localisation"]["latitude"], -18.91);
    assert_eq!(first["localisation"]["longitude"], 47.52);
    assert_eq!(first["id_entreprise"], "entreprises/ent0");
    assert_eq!(first["budget"], 150_000);
    assert_eq!(first["synchro"], false);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["synced"], 2);
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(json["updated"]["signalements"][1], "sig-00001");
}

#[test]
fn large_collection_is_marked_in_chunks() {
    let engine = faulty_engine(SyncConfig::default());
    seed_pending(engine.store(), Collection::Signalements, 1200);

    let report = engine.run_sync().unwrap();
    assert_eq!(report.synced, 1200);
    assert_eq!(engine.store().batch_sizes(), vec![500, 500, 200]);
}

#[test]
fn configured_batch_size_is_used() {
    let engine = faulty_engine(SyncConfig::new().with_max_batch_size(100));
    seed_pending(engine.store(), Collection::Roles, 250);
    seed_pending(engine.store(), Collection::Parametres, 30);

    engine.run_sync().unwrap();
    assert_eq!(engine.store().batch_sizes(), vec![100, 100, 50, 30]);
}

#[test]
fn failed_chunk_leaves_earlier_chunks_marked() {
    let engine = faulty_engine(SyncConfig::default());
    seed_pending(engine.store(), Collection::Signalements, 1200);
    engine.store().fail_commit(2);

    let err = engine.run_sync().unwrap_err();
    match &err {
        SyncError::BatchCommit {
            collection,
            chunk,
            chunks,
            committed,
            ..
        } => {
            assert_eq!(*collection, Collection::Signalements);
            assert_eq!((*chunk, *chunks, *committed), (2, 3, 500));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retryable());
    assert_eq!(engine.state(), SyncState::Error);
    assert_eq!(engine.stats().runs_failed, 1);

    let inner = engine.store().inner();
    assert_eq!(inner.count(Collection::Signalements, &Filter::pending()), 700);

    // The retry only sees what is still pending.
    let report = engine.run_sync().unwrap();
    assert_eq!(report.synced, 700);
    assert_eq!(inner.count(Collection::Signalements, &Filter::pending()), 0);
}

#[test]
fn failed_scan_marks_nothing() {
    let engine = faulty_engine(SyncConfig::default());
    seed_pending(engine.store(), Collection::Roles, 3);
    seed_pending(engine.store(), Collection::Signalements, 3);
    engine.store().fail_scan(Collection::Signalements);

    let err = engine.run_sync().unwrap_err();
    assert!(matches!(
        err,
        SyncError::Scan {
            collection: Collection::Signalements,
            ..
        }
    ));
    assert_eq!(engine.store().commit_attempts(), 0);
    assert_eq!(
        engine.store().inner().count(Collection::Roles, &Filter::pending()),
        3
    );
}

#[test]
fn empty_collections_are_skipped() {
    let engine = faulty_engine(SyncConfig::default());
    seed_pending(engine.store(), Collection::Roles, 2);
    seed_synced(engine.store(), Collection::Signalements, 2);

    let report = engine.run_sync().unwrap();
    assert_eq!(report.data.keys().copied().collect::<Vec<_>>(), vec![Collection::Roles]);
    assert_eq!(report.updated.keys().copied().collect::<Vec<_>>(), vec![Collection::Roles]);
    assert_eq!(engine.store().commit_attempts(), 1);
}

#[test]
fn slow_store_call_times_out() {
    let engine = faulty_engine(SyncConfig::new().with_call_timeout(Duration::from_millis(5)));
    seed_pending(engine.store(), Collection::Roles, 1);
    engine.store().set_latency(Some(Duration::from_millis(30)));

    let err = engine.run_sync().unwrap_err();
    assert!(matches!(err, SyncError::Timeout { operation: "scan", .. }));
    assert!(err.is_retryable());

    engine.store().heal();
    assert_eq!(engine.run_sync().unwrap().synced, 1);
}

#[test]
fn concurrent_edits_are_picked_up_later() {
    let store = Arc::new(MemoryStore::new());
    let ids = Arc::new(seed_synced(&*store, Collection::Signalements, 50));
    let engine = Arc::new(
        SyncEngine::with_shared_store(
            SyncConfig::new().with_max_batch_size(7),
            Arc::clone(&store),
        )
        .unwrap(),
    );

    let syncer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..20 {
                engine.run_sync().unwrap();
            }
        })
    };
    let result = stress_concurrent_edits(
        Arc::clone(&store),
        Collection::Signalements,
        ids,
        &StressConfig {
            operations: 400,
            threads: 4,
        },
    );
    syncer.join().unwrap();
    assert_eq!(result.failed_ops, 0);

    engine.run_sync().unwrap();
    assert_eq!(store.count(Collection::Signalements, &Filter::pending()), 0);
    assert_eq!(engine.active_runs(), 0);
}

#[test]
fn overlapping_runs_both_succeed() {
    let store = Arc::new(FaultyStore::new(MemoryStore::new()));
    let mut expected = BTreeSet::new();
    for collection in [Collection::Roles, Collection::Signalements] {
        for id in seed_pending(&*store, collection, 120) {
            expected.insert((collection, id));
        }
    }
    store.set_latency(Some(Duration::from_millis(2)));

    let engine = Arc::new(
        SyncEngine::with_shared_store(
            SyncConfig::new().with_max_batch_size(25),
            Arc::clone(&store),
        )
        .unwrap(),
    );
    let barrier = Arc::new(Barrier::new(2));

    let runs: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.run_sync()
            })
        })
        .collect();
    let reports: Vec<_> = runs
        .into_iter()
        .map(|run| run.join().unwrap().unwrap())
        .collect();

    let mut delivered = BTreeSet::new();
    for report in &reports {
        for (&collection, ids) in &report.updated {
            assert_eq!(report.records(collection).len(), ids.len());
            delivered.extend(ids.iter().map(|id| (collection, id.clone())));
        }
    }
    assert_eq!(delivered, expected);

    store.heal();
    for collection in [Collection::Roles, Collection::Signalements] {
        assert_eq!(store.inner().count(collection, &Filter::pending()), 0);
    }
    assert_eq!(engine.stats().runs_completed, 2);
    assert_eq!(engine.stats().runs_failed, 0);
    assert!(engine.run_sync().unwrap().is_empty());
}

#[test]
fn file_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        for i in 0..3 {
            store
                .set(Collection::Signalements, &format!("s{i}"), signalement_fields(i, false))
                .unwrap();
        }
        let engine = SyncEngine::new(SyncConfig::default(), store).unwrap();
        assert_eq!(engine.run_sync().unwrap().synced, 3);
    }

    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(reopened.count(Collection::Signalements, &Filter::pending()), 0);
    assert_eq!(reopened.count(Collection::Signalements, &Filter::All), 3);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn run_marks_pending_and_leaves_the_rest(docs in dataset_strategy(60)) {
            let store = MemoryStore::new();
            for doc in &docs {
                store.set(doc.collection, &doc.id, doc.fields.clone()).unwrap();
            }
            let engine = SyncEngine::new(SyncConfig::new().with_max_batch_size(4), store).unwrap();

            let report = engine.run_sync().unwrap();
            let pending: Vec<_> = docs.iter().filter(|d| d.is_pending()).collect();
            prop_assert_eq!(report.synced, pending.len());

            for doc in &docs {
                let stored = engine.store().get(doc.collection, &doc.id).unwrap().unwrap();
                if doc.is_pending() {
                    let mut expected: Fields = doc.fields.clone();
                    expected.insert("synchro".into(), true.into());
                    prop_assert_eq!(&stored.fields, &expected);

                    let ids = report.updated_ids(doc.collection);
                    prop_assert!(ids.contains(&doc.id));
                    let serialized = serialize_record(&doc.id, &doc.fields);
                    prop_assert!(report.records(doc.collection).contains(&serialized));
                } else {
                    prop_assert_eq!(&stored.fields, &doc.fields);
                    prop_assert!(!report.updated_ids(doc.collection).contains(&doc.id));
                }
            }

            prop_assert!(engine.run_sync().unwrap().is_empty());
        }
    }
}
