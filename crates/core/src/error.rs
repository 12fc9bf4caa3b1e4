//! Error types for the records layer
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! - `Configuration`: bad schema descriptor or config file, raised at startup only
//! - `Encoding` / `Decoding`: malformed key or value bytes
//! - `NotFound`: missing primary record (a normal branch, not a failure)
//! - `AlreadyExists`: strict create hit an existing record
//! - `TransactionConflict`: substrate commit conflict, passed through untouched

use thiserror::Error;

/// Result type alias for records operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the records layer and its substrate
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid schema descriptor or configuration
    ///
    /// Only produced while registering schemas or loading configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value could not be encoded into key or record bytes
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Key or record bytes are truncated or malformed
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// No primary record exists at the given key
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity type name
        entity: String,
        /// Display form of the primary key tuple
        key: String,
    },

    /// A record already exists at the given key (strict create)
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// Entity type name
        entity: String,
        /// Display form of the primary key tuple
        key: String,
    },

    /// Invalid operation or argument (unknown index, bad query prefix, ...)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Transaction aborted at commit due to a conflicting writer
    ///
    /// Retryable. The records layer never retries on its own.
    #[error("Transaction conflict: {reason}")]
    TransactionConflict {
        /// Description of the conflicting keys
        reason: String,
    },

    /// Transaction is not in a state that accepts the operation
    #[error("Transaction not active: {state}")]
    TransactionNotActive {
        /// Current transaction state
        state: String,
    },

    /// Substrate storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Create a decoding error
    pub fn decoding(msg: impl Into<String>) -> Self {
        Error::Decoding(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a not-found error for an entity key
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        Error::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Create an already-exists error for an entity key
    pub fn already_exists(entity: impl Into<String>, key: impl ToString) -> Self {
        Error::AlreadyExists {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Check if this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is an `AlreadyExists` error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }

    /// Check if this is a substrate conflict that the caller may retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::TransactionConflict { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Encoding(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Decoding(e.to_string())
    }
}
