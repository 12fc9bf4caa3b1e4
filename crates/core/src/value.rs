//! Scalar value model
//!
//! This module defines:
//! - ScalarKind: the closed set of field types a schema can declare
//! - Scalar: one typed value of a declared kind
//! - Tuple: an ordered sequence of scalars (primary keys, index prefixes)
//!
//! ## Ordering and Equality
//!
//! Scalars of different kinds are never equal. Ordering compares the kind
//! first, then the value. Floats use `total_cmp` and bit-pattern hashing so
//! tuples can key ordered and hashed maps; this matches the byte order the
//! key codec produces (`-0.0 < 0.0`, NaN sorts after +inf).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Declared type of an entity field
///
/// Resolved once when a schema descriptor is built; operations never
/// re-dispatch on reflected field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer
    U64,
    /// 32-bit IEEE-754 float
    F32,
    /// 64-bit IEEE-754 float
    F64,
    /// UTF-8 string
    String,
    /// Opaque bytes (nested or pre-serialized payloads)
    Bytes,
}

impl ScalarKind {
    /// Get the kind name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed scalar value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Kind of this value
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Bytes(_) => ScalarKind::Bytes,
        }
    }

    /// Get as str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if this is any signed integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::I32(v) => Some(i64::from(*v)),
            Scalar::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as u64 if this is any unsigned integer value
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::U32(v) => Some(u64::from(*v)),
            Scalar::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as f64 if this is any float value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::F32(v) => Some(f64::from(*v)),
            Scalar::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as bytes if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Scalar::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::I32(a), Scalar::I32(b)) => a.cmp(b),
            (Scalar::I64(a), Scalar::I64(b)) => a.cmp(b),
            (Scalar::U32(a), Scalar::U32(b)) => a.cmp(b),
            (Scalar::U64(a), Scalar::U64(b)) => a.cmp(b),
            (Scalar::F32(a), Scalar::F32(b)) => a.total_cmp(b),
            (Scalar::F64(a), Scalar::F64(b)) => a.total_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => a.cmp(b),
            (Scalar::Bytes(a), Scalar::Bytes(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Scalar::Bool(v) => v.hash(state),
            Scalar::I32(v) => v.hash(state),
            Scalar::I64(v) => v.hash(state),
            Scalar::U32(v) => v.hash(state),
            Scalar::U64(v) => v.hash(state),
            Scalar::F32(v) => v.to_bits().hash(state),
            Scalar::F64(v) => v.to_bits().hash(state),
            Scalar::String(v) => v.hash(state),
            Scalar::Bytes(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::I32(v) => write!(f, "{}", v),
            Scalar::I64(v) => write!(f, "{}", v),
            Scalar::U32(v) => write!(f, "{}", v),
            Scalar::U64(v) => write!(f, "{}", v),
            Scalar::F32(v) => write!(f, "{}", v),
            Scalar::F64(v) => write!(f, "{}", v),
            Scalar::String(v) => write!(f, "{:?}", v),
            Scalar::Bytes(v) => {
                f.write_str("0x")?;
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::I32(i)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::I64(i)
    }
}

impl From<u32> for Scalar {
    fn from(i: u32) -> Self {
        Scalar::U32(i)
    }
}

impl From<u64> for Scalar {
    fn from(i: u64) -> Self {
        Scalar::U64(i)
    }
}

impl From<f32> for Scalar {
    fn from(f: f32) -> Self {
        Scalar::F32(f)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::F64(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Scalar::String(s.clone())
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(b: Vec<u8>) -> Self {
        Scalar::Bytes(b)
    }
}

impl From<&[u8]> for Scalar {
    fn from(b: &[u8]) -> Self {
        Scalar::Bytes(b.to_vec())
    }
}

/// Ordered sequence of scalars
///
/// Used for primary keys, index values and query prefixes. Ordering is
/// element-wise, so a `BTreeMap<Tuple, _>` iterates in the same order as
/// the encoded keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple(Vec<Scalar>);

impl Tuple {
    /// Create an empty tuple
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a value
    pub fn push(&mut self, value: impl Into<Scalar>) {
        self.0.push(value.into());
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the tuple has no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the element at `index`
    pub fn get(&self, index: usize) -> Option<&Scalar> {
        self.0.get(index)
    }

    /// Borrow the elements
    pub fn values(&self) -> &[Scalar] {
        &self.0
    }

    /// Kinds of each element, in order
    pub fn kinds(&self) -> Vec<ScalarKind> {
        self.0.iter().map(Scalar::kind).collect()
    }

    /// Split off the elements from `at` onward into a new tuple
    pub fn split_off(&mut self, at: usize) -> Tuple {
        Tuple(self.0.split_off(at))
    }

    /// Check if `prefix` is an element-wise prefix of this tuple
    pub fn starts_with(&self, prefix: &Tuple) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Consume into the underlying vector
    pub fn into_inner(self) -> Vec<Scalar> {
        self.0
    }
}

impl From<Vec<Scalar>> for Tuple {
    fn from(values: Vec<Scalar>) -> Self {
        Tuple(values)
    }
}

impl FromIterator<Scalar> for Tuple {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        Tuple(iter.into_iter().collect())
    }
}

impl IntoIterator for Tuple {
    type Item = Scalar;
    type IntoIter = std::vec::IntoIter<Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Scalar;
    type IntoIter = std::slice::Iter<'a, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str(")")
    }
}

/// Build a [`Tuple`] from values convertible into [`Scalar`]
///
/// ```
/// use strata_core::{tuple, Scalar};
///
/// let pk = tuple!["alice", 30i32];
/// assert_eq!(pk.len(), 2);
/// assert_eq!(pk.get(0), Some(&Scalar::String("alice".to_string())));
/// ```
#[macro_export]
macro_rules! tuple {
    () => { $crate::Tuple::new() };
    ($($value:expr),+ $(,)?) => {
        $crate::Tuple::from(vec![$($crate::Scalar::from($value)),+])
    };
}
