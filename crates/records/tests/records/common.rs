//! Shared fixtures for the records suites.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use serde::{Deserialize, Serialize};
use strata_core::{Scalar, ScalarKind, Tuple};
use strata_engine::Database;
use strata_records::{Entity, EntitySchema, MsgPackCodec, RecordStore, RecordsConfig};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Person: a typed entity with a two-field index
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub score: f64,
}

impl Person {
    pub fn new(id: u64, name: &str, age: i32) -> Self {
        Person {
            id,
            name: name.to_string(),
            age,
            city: "oslo".to_string(),
            score: 0.0,
        }
    }

    pub fn in_city(mut self, city: &str) -> Self {
        self.city = city.to_string();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn pk(&self) -> Tuple {
        Tuple::from(vec![Scalar::U64(self.id)])
    }
}

impl Entity for Person {
    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "age" => Some(self.age.into()),
            "city" => Some(self.city.as_str().into()),
            "score" => Some(self.score.into()),
            _ => None,
        }
    }
}

pub fn person_schema() -> EntitySchema {
    EntitySchema::builder("person")
        .field("id", ScalarKind::U64)
        .field("name", ScalarKind::String)
        .field("age", ScalarKind::I32)
        .field("city", ScalarKind::String)
        .field("score", ScalarKind::F64)
        .primary_key(["id"])
        .index(["name", "age"])
        .index(["city"])
        .index(["score"])
        .build()
        .expect("valid person schema")
}

pub type PersonStore = RecordStore<Person, MsgPackCodec>;

pub fn person_store() -> PersonStore {
    person_store_with(&RecordsConfig::default())
}

pub fn person_store_with(config: &RecordsConfig) -> PersonStore {
    RecordStore::new(Arc::new(person_schema()), MsgPackCodec, config).expect("person store")
}

/// Fresh database plus person store.
pub fn setup() -> (Database, PersonStore) {
    init_tracing();
    (Database::new(), person_store())
}

/// Commit `people` in a single transaction.
pub fn seed(db: &Database, store: &PersonStore, people: &[Person]) {
    db.transaction(|txn| {
        for p in people {
            store.create(txn, p)?;
        }
        Ok(())
    })
    .expect("seed people");
}

/// Ids returned by a query, in result order.
pub fn ids(people: &[Person]) -> Vec<u64> {
    people.iter().map(|p| p.id).collect()
}
