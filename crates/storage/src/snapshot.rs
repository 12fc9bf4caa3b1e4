//! ClonedSnapshotView: snapshot implementation via deep clone
//!
//! Provides version-bounded views of storage for transaction isolation.
//! The snapshot is a deep clone of the BTreeMap taken under the read lock.
//!
//! # Design Notes
//!
//! - **Deep clone**: O(n) at creation, then lock-free reads
//! - **Immutable**: once created, the snapshot never changes
//! - **Thread-safe**: data is `Arc`-wrapped and can be shared across threads

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use crate::stored_value::StoredValue;

/// A snapshot view that clones the entire BTreeMap
///
/// # Example
///
/// ```ignore
/// let store = UnifiedStore::new();
/// let snapshot = store.create_snapshot();
///
/// // Writes after snapshot creation are not visible
/// store.put(b"k".to_vec(), b"v".to_vec());
/// assert!(snapshot.get(b"k").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ClonedSnapshotView {
    /// The version at which this snapshot was created
    version: u64,
    /// Deep clone of the storage data at snapshot time
    data: Arc<BTreeMap<Vec<u8>, StoredValue>>,
}

impl ClonedSnapshotView {
    /// Create a new ClonedSnapshotView from existing data
    ///
    /// This is typically called by `UnifiedStore::create_snapshot()`, not directly.
    pub fn new(version: u64, data: BTreeMap<Vec<u8>, StoredValue>) -> Self {
        Self {
            version,
            data: Arc::new(data),
        }
    }

    /// Create an empty snapshot at the given version
    pub fn empty(version: u64) -> Self {
        Self::new(version, BTreeMap::new())
    }

    /// Get a value as it existed at snapshot time
    pub fn get(&self, key: &[u8]) -> Option<&StoredValue> {
        self.data.get(key).filter(|sv| sv.version() <= self.version)
    }

    /// Scan `[begin, end)` as it existed at snapshot time
    pub fn scan_range(&self, begin: &[u8], end: &[u8]) -> Vec<(Vec<u8>, StoredValue)> {
        if begin >= end {
            return Vec::new();
        }
        self.data
            .range::<[u8], _>((Bound::Included(begin), Bound::Excluded(end)))
            .filter(|(_, sv)| sv.version() <= self.version)
            .map(|(k, sv)| (k.clone(), sv.clone()))
            .collect()
    }

    /// Get snapshot version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of keys visible in this snapshot
    pub fn len(&self) -> usize {
        self.data
            .values()
            .filter(|sv| sv.version() <= self.version)
            .count()
    }

    /// Check if no keys are visible
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
