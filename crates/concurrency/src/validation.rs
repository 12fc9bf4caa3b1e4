//! Transaction validation for OCC
//!
//! Conflict detection at commit time:
//! - First-committer-wins based on the READ-SET, not the write-set
//! - Blind writes (write without read) do NOT conflict
//! - Range scans are re-checked for phantoms: a key that now exists in a
//!   scanned range, was committed after the snapshot, and was never observed
//!   by the transaction aborts the commit
//! - Read-only transactions always commit

use rustc_hash::FxHashMap;
use strata_storage::UnifiedStore;

use crate::transaction::{RangeRead, TransactionContext};

/// Types of conflicts that can occur during transaction validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// Key was read at one version but the current version differs
    ReadWriteConflict {
        /// The key that has a conflict
        key: Vec<u8>,
        /// Version recorded in read_set when read
        read_version: u64,
        /// Current version in storage at validation time
        current_version: u64,
    },

    /// A key appeared inside a range the transaction scanned
    PhantomConflict {
        /// The newly visible key
        key: Vec<u8>,
        /// Version that introduced the key
        current_version: u64,
    },
}

/// Result of transaction validation
///
/// Accumulates all conflicts found during validation.
/// A transaction commits only if is_valid() returns true.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Create a validation result with a single conflict
    pub fn conflict(conflict: ConflictType) -> Self {
        ValidationResult {
            conflicts: vec![conflict],
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Validate the read-set against current storage state
///
/// For each key in read_set, the current version must equal the version
/// observed at read time (0 = absent).
pub fn validate_read_set(read_set: &FxHashMap<Vec<u8>, u64>, store: &UnifiedStore) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (key, read_version) in read_set {
        let current_version = store.version_of(key);
        if current_version != *read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version: *read_version,
                current_version,
            });
        }
    }

    result
}

/// Validate scanned ranges for phantom inserts
pub fn validate_range_reads(
    range_reads: &[RangeRead],
    read_set: &FxHashMap<Vec<u8>, u64>,
    start_version: u64,
    store: &UnifiedStore,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for range in range_reads {
        for (key, sv) in store.scan_range(&range.begin, &range.end) {
            if sv.version() > start_version && !read_set.contains_key(&key) {
                result.conflicts.push(ConflictType::PhantomConflict {
                    key,
                    current_version: sv.version(),
                });
            }
        }
    }

    result
}

/// Validate a complete transaction against current storage state
///
/// 1. Read-only transactions succeed immediately
/// 2. Read-set validation (read-write conflicts)
/// 3. Range validation (phantoms)
pub fn validate_transaction(txn: &TransactionContext, store: &UnifiedStore) -> ValidationResult {
    if txn.is_read_only() {
        return ValidationResult::ok();
    }

    let mut result = validate_read_set(&txn.read_set, store);
    result.merge(validate_range_reads(
        &txn.range_reads,
        &txn.read_set,
        txn.start_version,
        store,
    ));
    result
}
