//! Storage-layer value wrapper
//!
//! Every committed value carries the commit version that wrote it. Readers
//! use the version for snapshot visibility and optimistic validation.

/// A stored value and the version that wrote it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    value: Vec<u8>,
    version: u64,
}

impl StoredValue {
    /// Create a new stored value
    pub fn new(value: Vec<u8>, version: u64) -> Self {
        StoredValue { value, version }
    }

    /// Get the value bytes
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Get the commit version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Consume and return the value bytes
    #[inline]
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }
}
