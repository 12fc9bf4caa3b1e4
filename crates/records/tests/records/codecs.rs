//! Payload codecs and configuration files.

use std::sync::Arc;

use crate::common::*;
use proptest::prelude::*;
use strata_core::{tuple, Error};
use strata_records::{
    EntityCodec, FnCodec, MsgPackCodec, RecordStore, RecordsConfig, SchemaRegistry,
    CONFIG_FILE_NAME,
};
use tempfile::TempDir;

fn json_codec() -> impl EntityCodec<Person> {
    FnCodec::new(
        |p: &Person| serde_json::to_vec(p).map_err(|e| Error::encoding(e.to_string())),
        |bytes: &[u8]| serde_json::from_slice(bytes).map_err(|e| Error::decoding(e.to_string())),
    )
}

#[test]
fn json_payloads_work_through_the_codec_seam() {
    init_tracing();
    let db = strata_engine::Database::new();
    let store = RecordStore::new(Arc::new(person_schema()), json_codec(), &RecordsConfig::default())
        .unwrap();

    let p = Person::new(1, "jo", 44).in_city("bern");
    db.transaction(|txn| store.create(txn, &p)).unwrap();

    let raw = db
        .storage()
        .get(&store.record_key(&p.pk()).unwrap())
        .unwrap()
        .into_value();
    assert_eq!(raw.first(), Some(&b'{'));

    let hits = db
        .transaction(|txn| store.query_by_index(txn, "city", &tuple!["bern"]))
        .unwrap();
    assert_eq!(hits, vec![p]);
}

#[test]
fn registry_builds_store_from_config_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "root = \"app\"\ncreate_mode = \"upsert\"\n").unwrap();
    let config = RecordsConfig::from_file(&path).unwrap();

    let registry = SchemaRegistry::new();
    registry.register(person_schema()).unwrap();
    registry.register(person_schema()).unwrap();
    let store: PersonStore = registry.store("person", MsgPackCodec, &config).unwrap();

    let db = strata_engine::Database::new();
    seed(&db, &store, &[Person::new(1, "a", 1)]);
    seed(&db, &store, &[Person::new(1, "b", 2)]);

    let current = db.transaction(|txn| store.get(txn, &tuple![1u64])).unwrap();
    assert_eq!(current.name, "b");
    assert!(store.record_space().range().unwrap().0.starts_with(
        strata_records::Subspace::new("app").prefix()
    ));
}

#[test]
fn invalid_config_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "create_mode = \"maybe\"\n").unwrap();
    assert!(RecordsConfig::from_file(&path).unwrap_err().is_configuration());
}

fn any_person() -> impl Strategy<Value = Person> {
    (
        any::<u64>(),
        ".{0,12}",
        any::<i32>(),
        "[a-z]{0,6}",
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
    )
        .prop_map(|(id, name, age, city, score)| Person {
            id,
            name,
            age,
            city,
            score,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn entity_payload_round_trips(p in any_person()) {
        let bytes = MsgPackCodec.encode(&p).unwrap();
        let back: Person = MsgPackCodec.decode(&bytes).unwrap();
        prop_assert_eq!(back, p);
    }

    #[test]
    fn stored_entity_is_reachable_by_key_and_index(p in any_person()) {
        let (db, store) = setup();
        db.transaction(|txn| store.create(txn, &p)).unwrap();

        let by_key = db.transaction(|txn| store.get(txn, &p.pk())).unwrap();
        prop_assert_eq!(&by_key, &p);

        let by_index = db
            .transaction(|txn| {
                store.query_keys(txn, "name_and_age", &tuple![p.name.as_str(), p.age])
            })
            .unwrap();
        prop_assert_eq!(by_index, vec![p.pk()]);
    }
}
