//! Entity collaborators
//!
//! The store never looks inside an entity except through [`Entity::field`],
//! and never chooses a payload format: that is the job of an
//! [`EntityCodec`]. [`MsgPackCodec`] covers any serde type; [`Record`] is a
//! dynamic entity for schema-driven callers.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strata_core::{Result, Scalar};

/// Field access by declared name
pub trait Entity {
    /// Value of field `name`, or `None` if the entity has no such field
    fn field(&self, name: &str) -> Option<Scalar>;
}

impl<E: Entity + ?Sized> Entity for &E {
    fn field(&self, name: &str) -> Option<Scalar> {
        (**self).field(name)
    }
}

/// Opaque entity payload format
pub trait EntityCodec<E> {
    /// Serialize an entity
    fn encode(&self, entity: &E) -> Result<Vec<u8>>;
    /// Deserialize an entity
    fn decode(&self, bytes: &[u8]) -> Result<E>;
}

/// MessagePack payloads via `rmp-serde`
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl<E> EntityCodec<E> for MsgPackCodec
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, entity: &E) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(entity)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<E> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// Codec built from a pair of functions
///
/// ```
/// use strata_records::{EntityCodec, FnCodec};
///
/// let codec = FnCodec::new(
///     |s: &String| Ok(s.as_bytes().to_vec()),
///     |b: &[u8]| Ok(String::from_utf8_lossy(b).into_owned()),
/// );
/// assert_eq!(codec.decode(&codec.encode(&"hi".to_string()).unwrap()).unwrap(), "hi");
/// ```
pub struct FnCodec<E, Enc, Dec> {
    encode: Enc,
    decode: Dec,
    _entity: PhantomData<fn() -> E>,
}

impl<E, Enc, Dec> FnCodec<E, Enc, Dec>
where
    Enc: Fn(&E) -> Result<Vec<u8>>,
    Dec: Fn(&[u8]) -> Result<E>,
{
    /// Wrap an encode/decode pair
    pub fn new(encode: Enc, decode: Dec) -> Self {
        FnCodec {
            encode,
            decode,
            _entity: PhantomData,
        }
    }
}

impl<E, Enc, Dec> EntityCodec<E> for FnCodec<E, Enc, Dec>
where
    Enc: Fn(&E) -> Result<Vec<u8>>,
    Dec: Fn(&[u8]) -> Result<E>,
{
    fn encode(&self, entity: &E) -> Result<Vec<u8>> {
        (self.encode)(entity)
    }

    fn decode(&self, bytes: &[u8]) -> Result<E> {
        (self.decode)(bytes)
    }
}

/// Dynamic entity: field name → value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, Scalar>);

impl Record {
    /// Empty record
    pub fn new() -> Self {
        Record(BTreeMap::new())
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.0.insert(name.into(), value.into())
    }

    /// Borrow a field
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.get(name)
    }

    /// Remove a field
    pub fn remove(&mut self, name: &str) -> Option<Scalar> {
        self.0.remove(name)
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.0.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Entity for Record {
    fn field(&self, name: &str) -> Option<Scalar> {
        self.0.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
