//! Indexed entity records for Strata
//!
//! This crate stores typed entities on any ordered transactional key-value
//! substrate that implements `strata_core::{ReadTransaction, Transaction}`:
//! - codec: order-preserving, self-delimiting tuple encoding
//! - subspace: collision-free hierarchical key namespaces
//! - schema / registry: immutable entity descriptors, registered at startup
//! - store: primary-key CRUD, batch reads and full scans
//! - index: secondary index entries kept in step with every mutation
//! - query: prefix range queries over an index, dereferenced to entities
//!
//! Every operation runs inside the caller's transaction. Commit, abort and
//! conflict retry belong to the caller; conflicts surface unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod entity;
pub mod index;
mod query;
pub mod registry;
pub mod schema;
pub mod store;
pub mod subspace;

pub use config::{CreateMode, RecordsConfig, CONFIG_FILE_NAME};
pub use entity::{Entity, EntityCodec, FnCodec, MsgPackCodec, Record};
pub use index::{IndexEntry, IndexMaintainer};
pub use registry::SchemaRegistry;
pub use schema::{composite_index_name, EntitySchema, EntitySchemaBuilder, FieldDef, IndexDef, KeyFields};
pub use store::{IndexIssue, IndexReport, RecordStore};
pub use subspace::Subspace;
