//! Range query executor: prefix matching, ordering, stale entries.

use std::sync::Arc;

use crate::common::*;
use strata_core::{tuple, Error, ScalarKind};
use strata_records::{EntitySchema, MsgPackCodec, Record, RecordStore, RecordsConfig};

fn seed_people(db: &strata_engine::Database, store: &PersonStore) {
    seed(
        db,
        store,
        &[
            Person::new(1, "alice", 30),
            Person::new(2, "alice", 25),
            Person::new(3, "bob", 40),
        ],
    );
}

#[test]
fn prefix_returns_matching_records_in_index_order() {
    let (db, store) = setup();
    seed_people(&db, &store);

    let alices = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice"]))
        .unwrap();
    assert_eq!(ids(&alices), vec![2, 1]);
    assert_eq!(alices[0].age, 25);
}

#[test]
fn empty_prefix_returns_everything_lexicographically() {
    let (db, store) = setup();
    seed_people(&db, &store);

    let everyone = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple![]))
        .unwrap();
    assert_eq!(ids(&everyone), vec![2, 1, 3]);
}

#[test]
fn full_prefix_matches_exact_value() {
    let (db, store) = setup();
    seed_people(&db, &store);

    let hit = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice", 30i32]))
        .unwrap();
    assert_eq!(ids(&hit), vec![1]);

    let miss = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice", 31i32]))
        .unwrap();
    assert!(miss.is_empty());
}

#[test]
fn string_prefix_does_not_match_longer_strings() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[Person::new(1, "al", 1), Person::new(2, "alice", 1)],
    );

    let hits = db
        .transaction(|txn| store.query_keys(txn, "name_and_age", &tuple!["al"]))
        .unwrap();
    assert_eq!(hits, vec![tuple![1u64]]);
}

#[test]
fn string_prefix_excludes_values_continuing_with_nul() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[
            Person::new(1, "alice", 30),
            Person::new(2, "alice\0x", 5),
            Person::new(3, "alice\0", 7),
        ],
    );

    let alices = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice"]))
        .unwrap();
    assert_eq!(ids(&alices), vec![1]);

    let nul_x = db
        .transaction(|txn| store.query_keys(txn, "name_and_age", &tuple!["alice\0x"]))
        .unwrap();
    assert_eq!(nul_x, vec![tuple![2u64]]);

    // Ordering still places the shorter value first
    let everyone = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple![]))
        .unwrap();
    assert_eq!(ids(&everyone), vec![1, 3, 2]);
}

#[test]
fn bytes_prefix_excludes_values_continuing_with_nul() {
    let schema = EntitySchema::builder("blob")
        .field("id", ScalarKind::U32)
        .field("digest", ScalarKind::Bytes)
        .primary_key(["id"])
        .index(["digest"])
        .build()
        .unwrap();
    let store: RecordStore<Record, _> =
        RecordStore::new(Arc::new(schema), MsgPackCodec, &RecordsConfig::default()).unwrap();
    let (db, _) = setup();

    db.transaction(|txn| {
        store.create(txn, &Record::new().with("id", 1u32).with("digest", vec![0xABu8, 0x00]))?;
        store.create(txn, &Record::new().with("id", 2u32).with("digest", vec![0xABu8, 0x00, 0x00]))?;
        store.create(txn, &Record::new().with("id", 3u32).with("digest", vec![0xABu8]))
    })
    .unwrap();

    let hits = db
        .transaction(|txn| store.query_keys(txn, "digest", &tuple![vec![0xABu8]]))
        .unwrap();
    assert_eq!(hits, vec![tuple![3u32]]);

    let hits = db
        .transaction(|txn| store.query_keys(txn, "digest", &tuple![vec![0xABu8, 0x00]]))
        .unwrap();
    assert_eq!(hits, vec![tuple![1u32]]);
}

#[test]
fn duplicate_index_values_order_by_primary_key() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[
            Person::new(30, "x", 1).in_city("oslo"),
            Person::new(10, "y", 1).in_city("oslo"),
            Person::new(20, "z", 1).in_city("oslo"),
        ],
    );
    let keys = db
        .transaction(|txn| store.query_keys(txn, "city", &tuple!["oslo"]))
        .unwrap();
    assert_eq!(keys, vec![tuple![10u64], tuple![20u64], tuple![30u64]]);
}

#[test]
fn float_index_orders_negatives_first() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[
            Person::new(1, "a", 1).with_score(3.5),
            Person::new(2, "b", 1).with_score(-10.0),
            Person::new(3, "c", 1).with_score(0.0),
            Person::new(4, "d", 1).with_score(-0.5),
        ],
    );
    let ordered = db
        .transaction(|txn| store.query_by_index(txn, "score", &tuple![]))
        .unwrap();
    assert_eq!(ids(&ordered), vec![2, 4, 3, 1]);
}

#[test]
fn stale_entry_is_skipped_silently() {
    let (db, store) = setup();
    seed_people(&db, &store);

    // Remove the primary record behind the index's back
    let record_key = store.record_key(&tuple![2u64]).unwrap();
    assert!(db.storage().delete(&record_key).is_some());

    let alices = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice"]))
        .unwrap();
    assert_eq!(ids(&alices), vec![1]);

    // The raw key listing still sees the dangling entry
    let keys = db
        .transaction(|txn| store.query_keys(txn, "name_and_age", &tuple!["alice"]))
        .unwrap();
    assert_eq!(keys.len(), 2);
}

#[test]
fn limit_bounds_scanned_entries() {
    let (db, store) = setup();
    seed_people(&db, &store);
    let first_two = db
        .transaction(|txn| store.query_by_index_limit(txn, "name_and_age", &tuple![], 2))
        .unwrap();
    assert_eq!(ids(&first_two), vec![2, 1]);
}

#[test]
fn invalid_prefixes_are_rejected() {
    let (db, store) = setup();

    for (index, prefix) in [
        ("name_and_age", tuple![30i32]),
        ("name_and_age", tuple!["a", 1i32, 2i32]),
        ("city", tuple![1u64]),
        ("unknown", tuple![]),
    ] {
        let err = db
            .transaction(|txn| store.query_by_index(txn, index, &prefix))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)), "{} {}", index, prefix);
    }
}
