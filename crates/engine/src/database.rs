//! Database struct and transaction API
//!
//! The Database ties the committed store to the transaction manager and is
//! the substrate handed to the records layer.
//!
//! ## Transaction API
//!
//! 1. **Closure API** (recommended): `db.transaction(|txn| { ... })`
//!    - Automatic commit on success, abort on error
//!    - Returns the closure's return value
//!
//! 2. **Manual API**: `begin_transaction()` + `commit_transaction()`
//!    - For cases requiring external control over commit timing
//!
//! Conflicts surface as `Error::TransactionConflict`. The database never
//! retries; retry policy belongs to the caller.

use std::sync::Arc;

use strata_concurrency::{TransactionContext, TransactionManager, TransactionStats};
use strata_core::Result;
use strata_storage::UnifiedStore;
use tracing::debug;

/// In-memory ordered key-value database with OCC transactions
///
/// # Example
///
/// ```
/// use strata_core::{ReadTransaction, Transaction};
/// use strata_engine::Database;
///
/// let db = Database::new();
/// db.transaction(|txn| txn.set(b"greeting", b"hello")).unwrap();
///
/// let value = db.transaction(|txn| txn.get(b"greeting")).unwrap();
/// assert_eq!(value, Some(b"hello".to_vec()));
/// ```
pub struct Database {
    /// Committed state (thread-safe)
    storage: Arc<UnifiedStore>,

    /// Lifecycle, commit serialization and counters
    manager: TransactionManager,
}

impl Database {
    /// Create an empty database
    pub fn new() -> Self {
        Self::with_storage(Arc::new(UnifiedStore::new()))
    }

    /// Create a database over existing storage
    pub fn with_storage(storage: Arc<UnifiedStore>) -> Self {
        Database {
            storage,
            manager: TransactionManager::new(),
        }
    }

    /// Get the underlying storage
    ///
    /// Writes made directly on the store bypass transactions.
    pub fn storage(&self) -> &Arc<UnifiedStore> {
        &self.storage
    }

    /// Execute a closure within a transaction
    ///
    /// Commits if the closure returns `Ok`, aborts if it returns `Err`.
    ///
    /// # Errors
    /// - The closure's error, after the transaction is aborted
    /// - `TransactionConflict` if commit-time validation fails
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TransactionContext) -> Result<T>,
    {
        let mut txn = self.begin_transaction();

        match f(&mut txn) {
            Ok(value) => {
                self.commit_transaction(&mut txn)?;
                Ok(value)
            }
            Err(e) => {
                debug!(txn_id = txn.txn_id, error = %e, "closure failed, aborting");
                let _ = self.manager.abort(&mut txn, format!("Closure error: {}", e));
                Err(e)
            }
        }
    }

    /// Begin a new transaction (for manual control)
    ///
    /// The returned context must be committed or aborted by the caller.
    pub fn begin_transaction(&self) -> TransactionContext {
        self.manager.begin(&self.storage)
    }

    /// Commit a transaction, returning its commit version
    pub fn commit_transaction(&self, txn: &mut TransactionContext) -> Result<u64> {
        self.manager.commit(txn, &self.storage)
    }

    /// Abort a transaction, discarding its buffered writes
    pub fn abort_transaction(&self, txn: &mut TransactionContext) -> Result<()> {
        self.manager.abort(txn, "aborted by caller")
    }

    /// Transaction counters since the database was created
    pub fn stats(&self) -> TransactionStats {
        self.manager.stats()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
