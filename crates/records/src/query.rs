//! Range queries over secondary indexes
//!
//! A query names an index and supplies values for a prefix of its fields
//! (possibly none, possibly all). The executor:
//!
//! 1. packs the prefix under the index namespace
//! 2. scans the canonical prefix range in key order
//! 3. decodes each entry and strips the indexed values, leaving the
//!    primary key
//! 4. dereferences each primary key through the record namespace
//!
//! Results follow encoded key order: indexed values in declaration order,
//! then primary-key values. An entry whose record is gone is a stale
//! reference; it is skipped, never reported to the caller.

use strata_core::{Error, ReadTransaction, Result, Tuple};
use tracing::debug;

use crate::codec;
use crate::schema::IndexDef;
use crate::subspace::Subspace;

/// Outcome of dereferencing one index entry
#[derive(Debug)]
pub(crate) enum Resolved<E> {
    /// Record present
    Found(E),
    /// Entry points at a record that no longer exists
    StaleIndexReference(Tuple),
}

/// Scan an index and return primary keys in entry order
///
/// `prefix` must already be checked against the index key.
pub(crate) fn scan_primary_keys<T>(
    txn: &mut T,
    def: &IndexDef,
    space: &Subspace,
    prefix: &Tuple,
    limit: Option<usize>,
) -> Result<Vec<Tuple>>
where
    T: ReadTransaction + ?Sized,
{
    let (begin, end) = space.range_of(prefix.values())?;
    let indexed = def.fields().len();

    txn.get_range(&begin, &end, limit)?
        .into_iter()
        .map(|(key, _)| {
            let rest = space.unpack(&key)?;
            let mut tuple = codec::decode(rest, def.entry_kinds()).map_err(|e| match e {
                Error::Decoding(msg) => {
                    Error::decoding(format!("index '{}' entry: {}", def.name(), msg))
                }
                other => other,
            })?;
            Ok(tuple.split_off(indexed))
        })
        .collect()
}

/// Keep found records, skipping stale references
pub(crate) fn collect_found<E>(entity: &str, index: &str, resolved: Vec<Resolved<E>>) -> Vec<E> {
    let mut found = Vec::with_capacity(resolved.len());
    for item in resolved {
        match item {
            Resolved::Found(value) => found.push(value),
            Resolved::StaleIndexReference(pk) => {
                debug!(entity, index, pk = %pk, "skipping stale index entry");
            }
        }
    }
    found
}
