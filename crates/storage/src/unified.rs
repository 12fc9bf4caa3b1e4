//! UnifiedStore: ordered in-memory storage with version management
//!
//! This module implements the committed state of the reference substrate:
//! - `BTreeMap<Vec<u8>, StoredValue>` for ordered byte-key storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for monotonically increasing commit versions
//!
//! # Design Notes
//!
//! - **No version history**: each key stores only its latest value
//! - **Deletes remove the key**: readers observe version 0 for absent keys
//! - **Batches are atomic**: `apply_batch` holds the write lock for the whole
//!   transaction so no snapshot sees a partial commit

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use strata_core::Result;
use tracing::trace;

use crate::snapshot::ClonedSnapshotView;
use crate::stored_value::StoredValue;

/// Unified storage backend using BTreeMap with RwLock
///
/// Thread-safe through `parking_lot::RwLock` and `AtomicU64`.
#[derive(Debug)]
pub struct UnifiedStore {
    /// The main data store: ordered map from key bytes to StoredValue
    data: Arc<RwLock<BTreeMap<Vec<u8>, StoredValue>>>,
    /// Global version counter for monotonically increasing versions
    version: AtomicU64,
}

impl UnifiedStore {
    /// Create a new empty UnifiedStore
    ///
    /// Initial version is 0 (no writes have occurred).
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            version: AtomicU64::new(0),
        }
    }

    /// Allocate the next version atomically
    ///
    /// Versions are unique across all threads and strictly increasing.
    pub fn allocate_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Get current global version
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Get the committed value at `key`
    pub fn get(&self, key: &[u8]) -> Option<StoredValue> {
        self.data.read().get(key).cloned()
    }

    /// Get the committed version of `key` (0 if absent)
    pub fn version_of(&self, key: &[u8]) -> u64 {
        self.data.read().get(key).map_or(0, StoredValue::version)
    }

    /// Scan committed keys in `[begin, end)`
    pub fn scan_range(&self, begin: &[u8], end: &[u8]) -> Vec<(Vec<u8>, StoredValue)> {
        if begin >= end {
            return Vec::new();
        }
        self.data
            .read()
            .range::<[u8], _>((Bound::Included(begin), Bound::Excluded(end)))
            .map(|(k, sv)| (k.clone(), sv.clone()))
            .collect()
    }

    /// Write a single key outside any transaction
    ///
    /// Returns the version assigned to the write.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> u64 {
        let mut data = self.data.write();
        let version = self.allocate_version();
        data.insert(key, StoredValue::new(value, version));
        version
    }

    /// Delete a single key outside any transaction
    ///
    /// Returns the removed value if it existed.
    pub fn delete(&self, key: &[u8]) -> Option<StoredValue> {
        let mut data = self.data.write();
        let removed = data.remove(key);
        if removed.is_some() {
            self.allocate_version();
        }
        removed
    }

    /// Create a snapshot of the current state
    ///
    /// The read lock is taken BEFORE reading the version, so the snapshot
    /// version never lags behind the data it contains.
    pub fn create_snapshot(&self) -> ClonedSnapshotView {
        let data = self.data.read();
        let version = self.current_version();
        ClonedSnapshotView::new(version, data.clone())
    }

    /// Apply a batch of writes and deletes atomically
    ///
    /// # Arguments
    /// * `writes` - (key, value) pairs to write
    /// * `deletes` - keys to delete
    /// * `version` - the version to assign to every write
    ///
    /// # Atomicity
    ///
    /// All writes and deletes are applied under a single write lock acquisition.
    pub fn apply_batch(
        &self,
        writes: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
        version: u64,
    ) -> Result<()> {
        let mut data = self.data.write();

        for (key, value) in writes {
            data.insert(key.clone(), StoredValue::new(value.clone(), version));
        }
        for key in deletes {
            data.remove(key);
        }

        self.version.fetch_max(version, Ordering::SeqCst);
        trace!(
            version,
            writes = writes.len(),
            deletes = deletes.len(),
            "applied batch"
        );
        Ok(())
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for UnifiedStore {
    fn default() -> Self {
        Self::new()
    }
}
