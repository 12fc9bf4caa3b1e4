//! Conflict pass-through and concurrent writers.

use std::sync::Arc;
use std::thread;

use crate::common::*;
use strata_core::{tuple, Error};
use strata_engine::Database;

#[test]
fn concurrent_updates_of_same_record_conflict() {
    let (db, store) = setup();
    seed(&db, &store, &[Person::new(1, "alice", 30)]);

    let mut t1 = db.begin_transaction();
    let mut t2 = db.begin_transaction();
    store.update(&mut t1, &Person::new(1, "alice", 31)).unwrap();
    store.update(&mut t2, &Person::new(1, "alice", 32)).unwrap();

    db.commit_transaction(&mut t1).unwrap();
    let err = db.commit_transaction(&mut t2).unwrap_err();
    assert!(matches!(err, Error::TransactionConflict { .. }));

    let current = db.transaction(|txn| store.get(txn, &tuple![1u64])).unwrap();
    assert_eq!(current.age, 31);
    let report = db.transaction(|txn| store.verify_indexes(txn)).unwrap();
    assert!(report.is_consistent());
}

#[test]
fn concurrent_strict_creates_of_same_key_conflict() {
    let (db, store) = setup();

    let mut t1 = db.begin_transaction();
    let mut t2 = db.begin_transaction();
    store.create(&mut t1, &Person::new(1, "first", 1)).unwrap();
    store.create(&mut t2, &Person::new(1, "second", 2)).unwrap();

    db.commit_transaction(&mut t1).unwrap();
    assert!(db.commit_transaction(&mut t2).unwrap_err().is_conflict());
    let report = db.transaction(|txn| store.verify_indexes(txn)).unwrap();
    assert_eq!(report.records, 1);
    assert!(report.is_consistent());
}

#[test]
fn index_scan_conflicts_with_concurrent_insert() {
    let (db, store) = setup();
    seed(&db, &store, &[Person::new(1, "alice", 30)]);

    let mut reader = db.begin_transaction();
    let alices = store
        .query_by_index(&mut reader, "name_and_age", &tuple!["alice"])
        .unwrap();
    // Write something derived from the scan
    store
        .update(&mut reader, &Person::new(100, "summary", alices.len() as i32))
        .unwrap();

    seed(&db, &store, &[Person::new(2, "alice", 20)]);

    assert!(db.commit_transaction(&mut reader).unwrap_err().is_conflict());
}

#[test]
fn disjoint_writers_both_commit() {
    let (db, store) = setup();
    let mut t1 = db.begin_transaction();
    let mut t2 = db.begin_transaction();
    store.create(&mut t1, &Person::new(1, "a", 1)).unwrap();
    store.create(&mut t2, &Person::new(2, "b", 2)).unwrap();

    db.commit_transaction(&mut t1).unwrap();
    db.commit_transaction(&mut t2).unwrap();
    assert_eq!(db.transaction(|txn| store.scan(txn, None)).unwrap().len(), 2);
}

#[test]
fn parallel_writers_with_caller_retry_stay_consistent() {
    init_tracing();
    let db = Arc::new(Database::new());
    let store = Arc::new(person_store());

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let db = Arc::clone(&db);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..20u64 {
                    // Shared id range forces overlapping writes
                    let p = Person::new(i % 8, &format!("w{}", worker), i as i32)
                        .in_city(if i % 2 == 0 { "even" } else { "odd" });
                    loop {
                        match db.transaction(|txn| store.update(txn, &p)) {
                            Ok(()) => break,
                            Err(e) if e.is_conflict() => continue,
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let report = db.transaction(|txn| store.verify_indexes(txn)).unwrap();
    assert_eq!(report.records, 8);
    assert!(report.is_consistent(), "{:?}", report);
}
