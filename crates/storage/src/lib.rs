//! Storage layer for Strata records
//!
//! This crate implements the committed state of the reference substrate:
//! - UnifiedStore: byte-keyed BTreeMap storage with RwLock
//! - Version management with AtomicU64
//! - ClonedSnapshotView for snapshot-isolated reads

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod snapshot;
pub mod stored_value;
pub mod unified;

pub use snapshot::ClonedSnapshotView;
pub use stored_value::StoredValue;
pub use unified::UnifiedStore;
