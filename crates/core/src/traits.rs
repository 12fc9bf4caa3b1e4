//! Substrate capability traits
//!
//! The records layer needs exactly these capabilities from the ordered
//! key-value store beneath it:
//! - point get within a transaction
//! - ordered range scan `[begin, end)` within a transaction
//! - buffered set and clear within a transaction
//!
//! Isolation, conflict detection and commit belong to the implementor.
//! Reads take `&mut self` because an optimistic substrate records every key
//! it hands out in its read set.

use crate::error::Result;

/// Key-value pair returned by a range scan
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Read half of a substrate transaction
pub trait ReadTransaction {
    /// Get the value stored at `key`
    ///
    /// Returns `None` if the key is absent in this transaction's view.
    /// Uncommitted writes made through the same transaction are visible.
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Scan keys in `[begin, end)` in ascending byte order
    ///
    /// # Arguments
    /// * `begin` - first key (inclusive)
    /// * `end` - upper bound (exclusive)
    /// * `limit` - maximum number of pairs to return (`None` = all)
    fn get_range(
        &mut self,
        begin: &[u8],
        end: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>>;
}

/// Read-write substrate transaction
pub trait Transaction: ReadTransaction {
    /// Buffer a write of `value` at `key`
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Buffer removal of `key` (no-op if absent)
    fn clear(&mut self, key: &[u8]) -> Result<()>;
}

impl<T: ReadTransaction + ?Sized> ReadTransaction for &mut T {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn get_range(
        &mut self,
        begin: &[u8],
        end: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        (**self).get_range(begin, end, limit)
    }
}

impl<T: Transaction + ?Sized> Transaction for &mut T {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn clear(&mut self, key: &[u8]) -> Result<()> {
        (**self).clear(key)
    }
}
