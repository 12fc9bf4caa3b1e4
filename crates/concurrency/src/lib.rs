//! Concurrency layer for Strata records
//!
//! This crate implements optimistic concurrency control (OCC) with:
//! - TransactionContext: read/write set tracking with read-your-writes
//! - Snapshot isolation
//! - Conflict detection at commit time, including phantom range inserts
//! - TransactionManager: serialized validate-and-apply commits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::{TransactionManager, TransactionStats};
pub use transaction::{PendingOperations, RangeRead, TransactionContext, TransactionStatus};
pub use validation::{validate_transaction, ConflictType, ValidationResult};
