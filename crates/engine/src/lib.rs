//! Database engine for Strata records
//!
//! This crate assembles the reference substrate from the lower layers:
//! - Database: committed storage plus the OCC transaction manager
//! - Closure and manual transaction APIs
//!
//! Records are written against `strata_core::{ReadTransaction, Transaction}`;
//! `strata_concurrency::TransactionContext` is the implementation handed out
//! here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;

pub use database::Database;
pub use strata_concurrency::{TransactionContext, TransactionStats};
