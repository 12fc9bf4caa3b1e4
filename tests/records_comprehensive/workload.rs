//! Concurrent clients against one database.

use std::sync::Arc;
use std::thread;

use crate::common::*;
use strata_records_db::{tuple, Database, MsgPackCodec, Record, RecordsConfig};

#[test]
fn concurrent_tier_changes_keep_indexes_exact() {
    init_tracing();
    let registry = shop_registry().unwrap();
    let customers = Arc::new(
        registry
            .store::<Record, _>("customer", MsgPackCodec, &RecordsConfig::default())
            .unwrap(),
    );
    let db = Arc::new(Database::new());

    db.transaction(|txn| {
        for id in 0..10u32 {
            customers.create(
                txn,
                &Record::new()
                    .with("id", id)
                    .with("email", format!("c{}@example.com", id))
                    .with("tier", "basic"),
            )?;
        }
        Ok(())
    })
    .unwrap();

    let tiers = ["basic", "silver", "gold"];
    let handles: Vec<_> = (0..3usize)
        .map(|worker| {
            let db = Arc::clone(&db);
            let customers = Arc::clone(&customers);
            thread::spawn(move || {
                for round in 0..15u32 {
                    let id = (round * 7 + worker as u32) % 10;
                    let tier = tiers[(round as usize + worker) % 3];
                    with_retry(|| {
                        db.transaction(|txn| {
                            let mut rec = customers.get(txn, &tuple![id])?;
                            rec.set("tier", tier);
                            customers.update(txn, &rec)
                        })
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    db.transaction(|txn| {
        let report = customers.verify_indexes(txn)?;
        assert!(report.is_consistent(), "{:?}", report);

        let mut total = 0;
        for tier in tiers {
            total += customers.query_keys(txn, "tier", &tuple![tier])?.len();
        }
        assert_eq!(total, 10);
        Ok(())
    })
    .unwrap();

    let stats = db.stats();
    assert_eq!(stats.committed, 47);
    assert_eq!(stats.started, stats.committed + stats.aborted);
}
