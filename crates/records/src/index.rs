//! Secondary index maintenance
//!
//! An index entry is a key-only record under the index's namespace:
//!
//! ```text
//! <root>/<entity>/"index"/<index name>/<indexed values ++ primary key>  →  ""
//! ```
//!
//! The maintainer keeps entries in step with primary records inside the
//! caller's transaction:
//!
//! - update: clear each old entry that differs from the new one, then set
//!   every new entry (re-setting an unchanged key is harmless)
//! - delete: clear each entry derived from the last-known value
//!
//! Because both happen in the same transaction as the primary write, a
//! committed reader never sees an entry without its record or a record
//! missing one of its entries.

use std::sync::Arc;

use strata_core::{Result, Transaction, Tuple};
use tracing::trace;

use crate::entity::Entity;
use crate::schema::{EntitySchema, IndexDef};
use crate::subspace::Subspace;

const EMPTY_VALUE: &[u8] = &[];

/// One derived index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Composite index name
    pub index: String,
    /// Full encoded key, namespace included
    pub key: Vec<u8>,
}

/// Computes and applies index entries for one entity type
#[derive(Debug, Clone)]
pub struct IndexMaintainer {
    schema: Arc<EntitySchema>,
    spaces: Vec<Subspace>,
}

impl IndexMaintainer {
    /// Maintainer for `schema` with indexes under `base`
    ///
    /// Each index gets the child namespace `base/<index name>`.
    pub fn new(schema: Arc<EntitySchema>, base: &Subspace) -> Self {
        let spaces = schema
            .indexes()
            .iter()
            .map(|def| base.sub(def.name()))
            .collect();
        IndexMaintainer { schema, spaces }
    }

    /// Index definitions paired with their namespaces
    pub fn indexes(&self) -> impl Iterator<Item = (&IndexDef, &Subspace)> {
        self.schema.indexes().iter().zip(&self.spaces)
    }

    /// Look up an index and its namespace by composite name
    pub fn index(&self, name: &str) -> Option<(&IndexDef, &Subspace)> {
        self.indexes().find(|(def, _)| def.name() == name)
    }

    /// Index entry tuple (indexed values then primary key) for one index
    pub fn entry_tuple<E: Entity + ?Sized>(
        &self,
        def: &IndexDef,
        pk: &Tuple,
        entity: &E,
    ) -> Result<Tuple> {
        let mut values = def.key().extract(self.schema.name(), entity)?.into_inner();
        values.extend(pk.values().iter().cloned());
        Ok(Tuple::from(values))
    }

    /// Every index entry implied by `entity`
    pub fn entries<E: Entity + ?Sized>(&self, entity: &E) -> Result<Vec<IndexEntry>> {
        let pk = self.schema.primary_key_of(entity)?;
        self.entries_with_pk(&pk, entity)
    }

    fn entries_with_pk<E: Entity + ?Sized>(&self, pk: &Tuple, entity: &E) -> Result<Vec<IndexEntry>> {
        self.indexes()
            .map(|(def, space)| {
                let tuple = self.entry_tuple(def, pk, entity)?;
                Ok(IndexEntry {
                    index: def.name().to_string(),
                    key: space.pack(tuple.values()),
                })
            })
            .collect()
    }

    /// Synchronize entries for a write of `new` over `old`
    pub fn apply_update<T, E>(&self, txn: &mut T, old: Option<&E>, new: &E) -> Result<()>
    where
        T: Transaction + ?Sized,
        E: Entity + ?Sized,
    {
        let new_entries = self.entries(new)?;
        let old_entries = match old {
            Some(old) => self.entries(old)?,
            None => Vec::new(),
        };

        // Entries are produced in index declaration order for both sides
        for old_entry in &old_entries {
            let unchanged = new_entries
                .iter()
                .any(|n| n.index == old_entry.index && n.key == old_entry.key);
            if !unchanged {
                trace!(entity = self.schema.name(), index = %old_entry.index, "clear index entry");
                txn.clear(&old_entry.key)?;
            }
        }
        for entry in &new_entries {
            trace!(entity = self.schema.name(), index = %entry.index, "set index entry");
            txn.set(&entry.key, EMPTY_VALUE)?;
        }
        Ok(())
    }

    /// Remove every entry derived from `old`
    pub fn apply_delete<T, E>(&self, txn: &mut T, old: &E) -> Result<()>
    where
        T: Transaction + ?Sized,
        E: Entity + ?Sized,
    {
        for entry in self.entries(old)? {
            trace!(entity = self.schema.name(), index = %entry.index, "clear index entry");
            txn.clear(&entry.key)?;
        }
        Ok(())
    }

    /// Clear every entry of every index; returns the number removed
    pub fn clear_all<T: Transaction + ?Sized>(&self, txn: &mut T) -> Result<usize> {
        let mut removed = 0;
        for space in &self.spaces {
            let (begin, end) = space.range()?;
            for (key, _) in txn.get_range(&begin, &end, None)? {
                txn.clear(&key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
