//! Strata Records - transactional indexed entity storage
//!
//! Typed entities with a primary key and any number of secondary indexes,
//! stored on an ordered transactional key-value substrate. Every mutation
//! keeps the primary record and all of its index entries in one atomic
//! transaction.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use strata_records_db::{tuple, Database, EntitySchema, MsgPackCodec, Record, RecordsConfig, ScalarKind, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         EntitySchema::builder("person")
//!             .field("id", ScalarKind::U64)
//!             .field("name", ScalarKind::String)
//!             .field("age", ScalarKind::I32)
//!             .primary_key(["id"])
//!             .index(["name", "age"])
//!             .build()?,
//!     )?;
//! let people = registry.store::<Record, _>("person", MsgPackCodec, &RecordsConfig::default())?;
//!
//! let db = Database::new();
//! db.transaction(|txn| {
//!     people.create(txn, &Record::new().with("id", 1u64).with("name", "alice").with("age", 30i32))?;
//!     people.create(txn, &Record::new().with("id", 2u64).with("name", "alice").with("age", 25i32))
//! })?;
//!
//! let alices = db.transaction(|txn| people.query_by_index(txn, "name_and_age", &tuple!["alice"]))?;
//! assert_eq!(alices.len(), 2);
//! # Ok::<(), strata_records_db::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `strata_core`: scalar values, tuples, errors, substrate traits
//! - `strata_storage` / `strata_concurrency` / `strata_engine`: the in-memory
//!   OCC substrate
//! - `strata_records`: codec, namespaces, schemas, record store, indexes

pub use strata_core::{tuple, Error, ReadTransaction, Result, Scalar, ScalarKind, Transaction, Tuple};
pub use strata_engine::{Database, TransactionContext};
pub use strata_records::*;

/// Lower layers, for callers that need them directly
pub mod substrate {
    pub use strata_concurrency as concurrency;
    pub use strata_engine as engine;
    pub use strata_storage as storage;
}
