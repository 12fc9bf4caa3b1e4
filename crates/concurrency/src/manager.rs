//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation (first-committer-wins, phantom checks)
//! 2. Commit version allocation
//! 3. Storage application (visibility)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. acquire commit lock
//! 2. validate_and_mark() - Active → Validating → Committed | Aborted
//! 3. IF conflicts: return TransactionConflict
//! 4. allocate commit_version
//! 5. apply_batch() to storage
//! 6. release commit lock, return Ok(commit_version)
//! ```
//!
//! The commit lock serializes steps 2-5 so that no other commit can slip
//! between validation and application.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use strata_core::{Error, Result};
use strata_storage::UnifiedStore;
use tracing::{debug, warn};

use crate::transaction::TransactionContext;

/// Commit/abort counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    /// Transactions started
    pub started: u64,
    /// Transactions committed
    pub committed: u64,
    /// Transactions aborted (explicitly or by conflict)
    pub aborted: u64,
}

/// Manages transaction lifecycle and atomic commits
///
/// All keys in a transaction get the same commit version.
pub struct TransactionManager {
    /// Next transaction ID
    next_txn_id: AtomicU64,

    /// Serializes validate + apply
    commit_lock: Mutex<()>,

    started: AtomicU64,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(1),
            commit_lock: Mutex::new(()),
            started: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
        }
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Begin a transaction over a fresh snapshot of `store`
    pub fn begin(&self, store: &UnifiedStore) -> TransactionContext {
        let txn = TransactionContext::with_snapshot(self.next_txn_id(), store.create_snapshot());
        self.started.fetch_add(1, Ordering::Relaxed);
        debug!(
            txn_id = txn.txn_id,
            start_version = txn.start_version,
            "transaction started"
        );
        txn
    }

    /// Commit a transaction atomically
    ///
    /// # Returns
    /// - `Ok(commit_version)` on success; read-only transactions return
    ///   their start version
    /// - `Err(TransactionConflict)` if validation fails
    /// - `Err(TransactionNotActive)` if the transaction already finished
    pub fn commit(&self, txn: &mut TransactionContext, store: &UnifiedStore) -> Result<u64> {
        let _guard = self.commit_lock.lock();

        let validation = txn.validate_and_mark(store)?;
        if !validation.is_valid() {
            self.aborted.fetch_add(1, Ordering::Relaxed);
            warn!(
                txn_id = txn.txn_id,
                conflicts = validation.conflict_count(),
                "transaction aborted on conflict"
            );
            return Err(Error::TransactionConflict {
                reason: format!(
                    "transaction {} failed validation with {} conflict(s)",
                    txn.txn_id,
                    validation.conflict_count()
                ),
            });
        }

        if txn.is_read_only() {
            self.committed.fetch_add(1, Ordering::Relaxed);
            return Ok(txn.start_version);
        }

        let commit_version = store.allocate_version();
        let (writes, deletes) = txn.write_batch();
        store.apply_batch(&writes, &deletes, commit_version)?;

        self.committed.fetch_add(1, Ordering::Relaxed);
        debug!(
            txn_id = txn.txn_id,
            commit_version,
            writes = writes.len(),
            deletes = deletes.len(),
            "transaction committed"
        );
        Ok(commit_version)
    }

    /// Explicitly abort a transaction
    ///
    /// All buffered operations are discarded.
    pub fn abort(&self, txn: &mut TransactionContext, reason: impl Into<String>) -> Result<()> {
        txn.mark_aborted(reason.into())?;
        self.aborted.fetch_add(1, Ordering::Relaxed);
        debug!(txn_id = txn.txn_id, "transaction aborted");
        Ok(())
    }

    /// Snapshot of the lifecycle counters
    pub fn stats(&self) -> TransactionStats {
        TransactionStats {
            started: self.started.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
