//! Primary store tests: create, get, update, delete, batch get, scan.

use crate::common::*;
use strata_core::{tuple, Error, Tuple};
use strata_records::RecordsConfig;

#[test]
fn create_then_get_round_trips() {
    let (db, store) = setup();
    let alice = Person::new(1, "alice", 30).with_score(-2.5);
    seed(&db, &store, &[alice.clone()]);

    let back = db.transaction(|txn| store.get(txn, &alice.pk())).unwrap();
    assert_eq!(back, alice);
}

#[test]
fn get_missing_is_not_found_branch() {
    let (db, store) = setup();
    let err = db.transaction(|txn| store.get(txn, &tuple![42u64])).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound { ref entity, .. } if entity == "person"));
}

#[test]
fn strict_create_of_taken_key_fails_and_keeps_original() {
    let (db, store) = setup();
    seed(&db, &store, &[Person::new(1, "alice", 30)]);

    let err = db
        .transaction(|txn| store.create(txn, &Person::new(1, "mallory", 99)))
        .unwrap_err();
    assert!(err.is_already_exists());

    let kept = db.transaction(|txn| store.get(txn, &tuple![1u64])).unwrap();
    assert_eq!(kept.name, "alice");
}

#[test]
fn upsert_create_overwrites() {
    init_tracing();
    let db = strata_engine::Database::new();
    let store = person_store_with(&RecordsConfig::from_toml_str("create_mode = \"upsert\"").unwrap());

    seed(&db, &store, &[Person::new(1, "alice", 30)]);
    seed(&db, &store, &[Person::new(1, "alicia", 31)]);

    let current = db.transaction(|txn| store.get(txn, &tuple![1u64])).unwrap();
    assert_eq!(current.name, "alicia");
    let stale = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["alice"]))
        .unwrap();
    assert!(stale.is_empty());
}

#[test]
fn update_of_absent_record_creates_it() {
    let (db, store) = setup();
    let bob = Person::new(2, "bob", 40);
    db.transaction(|txn| store.update(txn, &bob)).unwrap();

    assert!(db.transaction(|txn| store.exists(txn, &bob.pk())).unwrap());
    let found = db
        .transaction(|txn| store.query_by_index(txn, "name_and_age", &tuple!["bob", 40i32]))
        .unwrap();
    assert_eq!(found, vec![bob]);
}

#[test]
fn delete_removes_record_and_reports_presence() {
    let (db, store) = setup();
    seed(&db, &store, &[Person::new(1, "alice", 30)]);

    assert!(db.transaction(|txn| store.delete(txn, &tuple![1u64])).unwrap());
    assert!(!db.transaction(|txn| store.delete(txn, &tuple![1u64])).unwrap());
    assert!(db
        .transaction(|txn| store.get(txn, &tuple![1u64]))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn batch_get_omits_missing_keys() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[Person::new(1, "a", 1), Person::new(3, "c", 3)],
    );

    let keys = [tuple![1u64], tuple![2u64], tuple![3u64]];
    let found = db.transaction(|txn| store.batch_get(txn, &keys)).unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.contains_key(&tuple![1u64]));
    assert!(!found.contains_key(&tuple![2u64]));
    assert_eq!(found[&tuple![3u64]].name, "c");
}

#[test]
fn batch_get_of_nothing_is_empty() {
    let (db, store) = setup();
    let none: Vec<Tuple> = Vec::new();
    assert!(db.transaction(|txn| store.batch_get(txn, &none)).unwrap().is_empty());
}

#[test]
fn scan_lists_every_record_in_key_order() {
    let (db, store) = setup();
    seed(
        &db,
        &store,
        &[
            Person::new(300, "c", 1),
            Person::new(2, "a", 1),
            Person::new(40, "b", 1),
        ],
    );

    let all = db.transaction(|txn| store.scan(txn, None)).unwrap();
    let keys: Vec<u64> = all.iter().map(|(_, p)| p.id).collect();
    assert_eq!(keys, vec![2, 40, 300]);

    let first = db.transaction(|txn| store.scan(txn, Some(1))).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].0, tuple![2u64]);
}

#[test]
fn read_your_writes_inside_transaction() {
    let (db, store) = setup();
    db.transaction(|txn| {
        let p = Person::new(7, "gwen", 22);
        store.create(txn, &p)?;
        assert_eq!(store.get(txn, &p.pk())?, p);
        let hits = store.query_by_index(txn, "name_and_age", &tuple!["gwen"])?;
        assert_eq!(hits, vec![p.clone()]);

        store.delete(txn, &p.pk())?;
        assert!(store.find(txn, &p.pk())?.is_none());
        assert!(store.query_by_index(txn, "city", &tuple![])?.is_empty());
        Ok(())
    })
    .unwrap();
}

#[test]
fn failed_closure_leaves_no_trace() {
    let (db, store) = setup();
    let result: strata_core::Result<()> = db.transaction(|txn| {
        store.create(txn, &Person::new(1, "ghost", 1))?;
        Err(Error::invalid_operation("caller gave up"))
    });
    assert!(result.is_err());
    assert!(db.storage().is_empty());
}

#[test]
fn undecodable_payload_fails_get_and_delete() {
    let (db, store) = setup();
    let key = store.record_key(&tuple![9u64]).unwrap();
    db.storage().put(key, vec![0xC1]);

    let get_err = db.transaction(|txn| store.get(txn, &tuple![9u64])).unwrap_err();
    assert!(matches!(get_err, Error::Decoding(_)));
    let del_err = db
        .transaction(|txn| store.delete(txn, &tuple![9u64]))
        .unwrap_err();
    assert!(matches!(del_err, Error::Decoding(_)));
}
