//! Transaction context for OCC
//!
//! This module implements the core transaction data structure for optimistic
//! concurrency control. TransactionContext tracks all reads, range scans,
//! writes and deletes for a transaction, enabling validation at commit time.
//!
//! It implements the substrate capability traits (`ReadTransaction`,
//! `Transaction`) the records layer is written against.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use strata_core::{Error, KeyValue, ReadTransaction, Result, Transaction};
use strata_storage::{ClonedSnapshotView, UnifiedStore};

use crate::validation::{validate_transaction, ValidationResult};

/// Status of a transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `Validating` (begin commit)
/// - `Validating` → `Committed` (validation passed)
/// - `Validating` → `Aborted` (conflict detected)
/// - `Active` → `Aborted` (user abort or error)
///
/// Terminal states (no transitions allowed):
/// - `Committed`
/// - `Aborted`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Transaction is being validated for conflicts
    Validating,
    /// Transaction committed successfully
    Committed,
    /// Transaction was aborted
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

/// A range scanned from the snapshot
///
/// Recorded so that keys inserted into the range by a concurrent committer
/// are detected at validation time (phantom protection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    /// First key of the range (inclusive)
    pub begin: Vec<u8>,
    /// Upper bound of the range (exclusive)
    pub end: Vec<u8>,
}

/// Summary of pending operations that would be rolled back on abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperations {
    /// Number of pending set operations
    pub sets: usize,
    /// Number of pending clear operations
    pub clears: usize,
}

impl PendingOperations {
    /// Total number of pending operations
    pub fn total(&self) -> usize {
        self.sets + self.clears
    }

    /// Check if there are no pending operations
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Transaction context for OCC with snapshot isolation
///
/// # Read-Your-Writes Semantics
///
/// When reading a key, the transaction checks in order:
/// 1. **write_set**: returns the uncommitted write from this transaction
/// 2. **delete_set**: returns None for an uncommitted clear
/// 3. **snapshot**: returns the snapshot value and tracks it in `read_set`
///
/// # Lifecycle
///
/// 1. **BEGIN**: created by `TransactionManager::begin`, status is `Active`
/// 2. **READ/WRITE**: `get`, `get_range`, `set`, `clear`
/// 3. **VALIDATE**: `commit` checks the read set and range reads
/// 4. **COMMIT/ABORT**: writes applied atomically, or discarded
pub struct TransactionContext {
    /// Unique transaction ID
    pub txn_id: u64,

    /// Version at transaction start (snapshot version)
    pub start_version: u64,

    snapshot: ClonedSnapshotView,

    /// Keys read and their versions (for validation)
    ///
    /// Version 0 means the key did not exist when read.
    pub read_set: FxHashMap<Vec<u8>, u64>,

    /// Ranges scanned from the snapshot
    pub range_reads: Vec<RangeRead>,

    /// Keys written with their new values (buffered, ordered for range merges)
    pub write_set: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Keys to clear (buffered)
    pub delete_set: BTreeSet<Vec<u8>>,

    /// Current transaction status
    pub status: TransactionStatus,

    start_time: Instant,
}

impl TransactionContext {
    /// Create a new transaction context over a snapshot
    ///
    /// # Example
    ///
    /// ```
    /// use strata_concurrency::TransactionContext;
    /// use strata_storage::ClonedSnapshotView;
    ///
    /// let txn = TransactionContext::with_snapshot(1, ClonedSnapshotView::empty(100));
    /// assert!(txn.is_active());
    /// assert_eq!(txn.start_version, 100);
    /// ```
    pub fn with_snapshot(txn_id: u64, snapshot: ClonedSnapshotView) -> Self {
        TransactionContext {
            txn_id,
            start_version: snapshot.version(),
            snapshot,
            read_set: FxHashMap::default(),
            range_reads: Vec::new(),
            write_set: BTreeMap::new(),
            delete_set: BTreeSet::new(),
            status: TransactionStatus::Active,
            start_time: Instant::now(),
        }
    }

    // === Read Operations ===

    fn read_key(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_active()?;

        if let Some(value) = self.write_set.get(key) {
            return Ok(Some(value.clone()));
        }
        if self.delete_set.contains(key) {
            return Ok(None);
        }

        match self.snapshot.get(key) {
            Some(sv) => {
                let value = sv.value().to_vec();
                self.read_set.insert(key.to_vec(), sv.version());
                Ok(Some(value))
            }
            None => {
                // If someone creates this key before we commit, we conflict
                self.read_set.insert(key.to_vec(), 0);
                Ok(None)
            }
        }
    }

    fn read_range(
        &mut self,
        begin: &[u8],
        end: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        self.ensure_active()?;
        if begin >= end {
            return Ok(Vec::new());
        }

        let mut results: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

        for (key, sv) in self.snapshot.scan_range(begin, end) {
            if self.delete_set.contains(&key) {
                continue;
            }
            self.read_set.insert(key.clone(), sv.version());
            results.insert(key, sv.into_value());
        }

        for (key, value) in self
            .write_set
            .range::<[u8], _>((Bound::Included(begin), Bound::Excluded(end)))
        {
            results.insert(key.clone(), value.clone());
        }

        self.range_reads.push(RangeRead {
            begin: begin.to_vec(),
            end: end.to_vec(),
        });

        Ok(results
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    /// Get the version that was read for a key (from read_set)
    ///
    /// Returns None if the key hasn't been read from snapshot.
    /// Returns Some(0) if the key was read but didn't exist.
    pub fn get_read_version(&self, key: &[u8]) -> Option<u64> {
        self.read_set.get(key).copied()
    }

    // === Write Operations ===

    fn write_key(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.delete_set.remove(key);
        self.write_set.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn clear_key(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.write_set.remove(key);
        self.delete_set.insert(key.to_vec());
        Ok(())
    }

    // === State Management ===

    /// Check if transaction is in Active state
    pub fn is_active(&self) -> bool {
        matches!(self.status, TransactionStatus::Active)
    }

    /// Check if transaction is committed
    pub fn is_committed(&self) -> bool {
        matches!(self.status, TransactionStatus::Committed)
    }

    /// Check if transaction is aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TransactionStatus::Aborted { .. })
    }

    /// Check if the transaction has no buffered writes
    ///
    /// Read-only transactions always commit.
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.delete_set.is_empty()
    }

    /// Get the elapsed time since transaction started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Check if this transaction has exceeded the given timeout
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.elapsed() > timeout
    }

    /// Get summary of pending operations
    pub fn pending_operations(&self) -> PendingOperations {
        PendingOperations {
            sets: self.write_set.len(),
            clears: self.delete_set.len(),
        }
    }

    /// Check if transaction can accept operations
    ///
    /// # Errors
    /// Returns `TransactionNotActive` if transaction is not in `Active` state.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::TransactionNotActive {
                state: format!("transaction {} is {:?}", self.txn_id, self.status),
            })
        }
    }

    /// Abort the transaction and discard buffered operations
    ///
    /// Can be called from `Active` (user abort) or `Validating` (conflict detected).
    ///
    /// # Errors
    /// Returns `TransactionNotActive` if already `Committed` or `Aborted`.
    pub fn mark_aborted(&mut self, reason: String) -> Result<()> {
        match &self.status {
            TransactionStatus::Committed | TransactionStatus::Aborted { .. } => {
                Err(Error::TransactionNotActive {
                    state: format!(
                        "cannot abort transaction {} from {:?}",
                        self.txn_id, self.status
                    ),
                })
            }
            _ => {
                self.status = TransactionStatus::Aborted { reason };
                self.write_set.clear();
                self.delete_set.clear();
                // read_set is kept for diagnostics
                Ok(())
            }
        }
    }

    /// Validate against current storage and transition state
    ///
    /// 1. `Active` → `Validating`
    /// 2. Validate read set and range reads against `store`
    /// 3. `Validating` → `Committed`, or `Aborted` on conflict
    ///
    /// Does not apply writes; see `TransactionManager::commit`.
    pub fn validate_and_mark(&mut self, store: &UnifiedStore) -> Result<ValidationResult> {
        self.ensure_active()?;
        self.status = TransactionStatus::Validating;

        let validation = validate_transaction(self, store);
        if validation.is_valid() {
            self.status = TransactionStatus::Committed;
        } else {
            self.status = TransactionStatus::Aborted {
                reason: format!(
                    "Commit failed: {} conflict(s) detected",
                    validation.conflict_count()
                ),
            };
        }
        Ok(validation)
    }

    /// Buffered writes as a flat batch
    pub fn write_batch(&self) -> (Vec<(Vec<u8>, Vec<u8>)>, Vec<Vec<u8>>) {
        let writes = self
            .write_set
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let deletes = self.delete_set.iter().cloned().collect();
        (writes, deletes)
    }
}

impl ReadTransaction for TransactionContext {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.read_key(key)
    }

    fn get_range(
        &mut self,
        begin: &[u8],
        end: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        self.read_range(begin, end, limit)
    }
}

impl Transaction for TransactionContext {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.write_key(key, value)
    }

    fn clear(&mut self, key: &[u8]) -> Result<()> {
        self.clear_key(key)
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("start_version", &self.start_version)
            .field("status", &self.status)
            .field("reads", &self.read_set.len())
            .field("writes", &self.write_set.len())
            .field("deletes", &self.delete_set.len())
            .finish()
    }
}
