//! Core types and traits for Strata records
//!
//! This crate defines the foundational types used throughout the system:
//! - Scalar / ScalarKind: typed field values and their declared kinds
//! - Tuple: ordered scalar sequence used for primary keys and index prefixes
//! - Error: error type hierarchy
//! - Traits: substrate capability set (ReadTransaction, Transaction)
//! - Key helpers: canonical prefix ranges

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod traits;
pub mod value;

pub use error::{Error, Result};
pub use key::{prefix_range, strinc, tuple_prefix_range};
pub use traits::{KeyValue, ReadTransaction, Transaction};
pub use value::{Scalar, ScalarKind, Tuple};
