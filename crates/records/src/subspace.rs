//! Hierarchical key namespaces
//!
//! A `Subspace` is a byte prefix built from tuple-encoded string elements.
//! Because every element is self-delimiting, `a.sub("x")` and `a.sub("xy")`
//! never share keys, and no key packed under one child can fall inside
//! another child's range. Ranges end at `prefix ++ [0xFF]` rather than at
//! the byte-successor of the prefix, so names and values that continue with
//! an escaped `0x00` stay outside.

use std::fmt;

use strata_core::{tuple_prefix_range, Error, Result, Scalar};

use crate::codec;

/// A collision-free key prefix
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Subspace {
    prefix: Vec<u8>,
}

impl Subspace {
    /// Top-level namespace for `name`
    pub fn new(name: &str) -> Self {
        Subspace {
            prefix: codec::encode(&[Scalar::from(name)]),
        }
    }

    /// Child namespace one level below this one
    pub fn sub(&self, name: &str) -> Subspace {
        let mut prefix = self.prefix.clone();
        codec::encode_scalar(&mut prefix, &Scalar::from(name));
        Subspace { prefix }
    }

    /// Raw prefix bytes
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Key for `values` inside this namespace
    pub fn pack(&self, values: &[Scalar]) -> Vec<u8> {
        let mut key = self.prefix.clone();
        codec::encode_into(&mut key, values);
        key
    }

    /// Strip this namespace's prefix from `key`
    pub fn unpack<'a>(&self, key: &'a [u8]) -> Result<&'a [u8]> {
        self.strip(key).ok_or_else(|| {
            Error::decoding(format!(
                "key {:02x?} is outside namespace {:02x?}",
                key, self.prefix
            ))
        })
    }

    /// `[begin, end)` covering every key in this namespace
    pub fn range(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        tuple_prefix_range(&self.prefix)
    }

    /// `[begin, end)` covering every key whose tuple starts with `values`
    pub fn range_of(&self, values: &[Scalar]) -> Result<(Vec<u8>, Vec<u8>)> {
        tuple_prefix_range(&self.pack(values))
    }

    /// Check whether `key` lies inside this namespace
    pub fn contains(&self, key: &[u8]) -> bool {
        self.strip(key).is_some()
    }

    // A leading 0xFF continues the last name element past its escaped 0x00
    fn strip<'a>(&self, key: &'a [u8]) -> Option<&'a [u8]> {
        key.strip_prefix(self.prefix.as_slice())
            .filter(|rest| rest.first() != Some(&0xFF))
    }
}

impl fmt::Debug for Subspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match codec::unpack(&self.prefix) {
            Ok(path) => write!(f, "Subspace{}", path),
            Err(_) => write!(f, "Subspace({:02x?})", self.prefix),
        }
    }
}
