//! RecordStore: primary records plus their secondary indexes
//!
//! One generic engine serves every entity type; the behaviour for a type is
//! fixed by the [`EntitySchema`] it is built with. All operations run inside
//! a caller-supplied transaction and never commit, retry or lock on their
//! own.
//!
//! ## Key Layout
//!
//! ```text
//! <root>/<entity>/"record"/<primary key>                       → payload
//! <root>/<entity>/"index"/<index name>/<indexed ++ primary key> → ""
//! ```
//!
//! ## Create vs Update
//!
//! `update` always overwrites (and creates when absent). `create` depends on
//! [`CreateMode`]: `Strict` fails with `AlreadyExists`, `Upsert` behaves
//! like `update`.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;

use strata_core::{Error, ReadTransaction, Result, Transaction, Tuple};
use tracing::debug;

use crate::codec;
use crate::config::{CreateMode, RecordsConfig};
use crate::entity::{Entity, EntityCodec};
use crate::index::IndexMaintainer;
use crate::query::{self, Resolved};
use crate::schema::{EntitySchema, IndexDef};
use crate::subspace::Subspace;

/// Namespace level holding primary records
pub const RECORD_SPACE: &str = "record";
/// Namespace level holding index entries
pub const INDEX_SPACE: &str = "index";

/// One index entry that disagrees with the primary records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexIssue {
    /// Composite index name
    pub index: String,
    /// Decoded entry: indexed values then primary key
    pub entry: Tuple,
}

/// Result of [`RecordStore::verify_indexes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Primary records examined
    pub records: usize,
    /// Index entries found
    pub entries: usize,
    /// Entries implied by a record but absent
    pub missing: Vec<IndexIssue>,
    /// Entries present but not implied by any record
    pub dangling: Vec<IndexIssue>,
}

impl IndexReport {
    /// No missing and no dangling entries
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.dangling.is_empty()
    }
}

/// Indexed entity storage for one entity type
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata_core::{tuple, ScalarKind};
/// use strata_engine::Database;
/// use strata_records::{EntitySchema, MsgPackCodec, Record, RecordStore, RecordsConfig};
///
/// let schema = EntitySchema::builder("user")
///     .field("id", ScalarKind::U64)
///     .field("email", ScalarKind::String)
///     .primary_key(["id"])
///     .index(["email"])
///     .build()
///     .unwrap();
/// let users: RecordStore<Record, _> =
///     RecordStore::new(Arc::new(schema), MsgPackCodec, &RecordsConfig::default()).unwrap();
///
/// let db = Database::new();
/// let alice = Record::new().with("id", 1u64).with("email", "alice@example.com");
/// db.transaction(|txn| users.create(txn, &alice)).unwrap();
///
/// let found = db
///     .transaction(|txn| users.query_by_index(txn, "email", &tuple!["alice@example.com"]))
///     .unwrap();
/// assert_eq!(found, vec![alice]);
/// ```
pub struct RecordStore<E, C> {
    schema: Arc<EntitySchema>,
    codec: C,
    records: Subspace,
    indexes: IndexMaintainer,
    create_mode: CreateMode,
    _entity: PhantomData<fn() -> E>,
}

impl<E, C> RecordStore<E, C>
where
    E: Entity,
    C: EntityCodec<E>,
{
    /// Build a store for `schema` under the namespace root from `config`
    pub fn new(schema: Arc<EntitySchema>, codec: C, config: &RecordsConfig) -> Result<Self> {
        config.validate()?;
        let entity_space = Subspace::new(&config.root).sub(schema.name());
        let indexes = IndexMaintainer::new(Arc::clone(&schema), &entity_space.sub(INDEX_SPACE));
        Ok(RecordStore {
            records: entity_space.sub(RECORD_SPACE),
            indexes,
            create_mode: config.create_mode()?,
            schema,
            codec,
            _entity: PhantomData,
        })
    }

    /// Schema this store was built with
    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Payload codec
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Create policy in effect
    pub fn create_mode(&self) -> CreateMode {
        self.create_mode
    }

    /// Namespace of the primary records
    pub fn record_space(&self) -> &Subspace {
        &self.records
    }

    /// Index maintainer for this entity type
    pub fn index_maintainer(&self) -> &IndexMaintainer {
        &self.indexes
    }

    /// Primary-key tuple of `entity`
    pub fn primary_key_of(&self, entity: &E) -> Result<Tuple> {
        self.schema.primary_key_of(entity)
    }

    /// Storage key of the record at `pk`
    ///
    /// # Errors
    /// `InvalidOperation` if `pk` does not match the declared primary key.
    pub fn record_key(&self, pk: &Tuple) -> Result<Vec<u8>> {
        self.schema
            .primary_key()
            .check_complete(&format!("primary key of '{}'", self.schema.name()), pk)?;
        Ok(self.records.pack(pk.values()))
    }

    fn load<T: ReadTransaction + ?Sized>(&self, txn: &mut T, key: &[u8]) -> Result<Option<E>> {
        match txn.get(key)? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Transaction + ?Sized>(
        &self,
        txn: &mut T,
        key: &[u8],
        old: Option<&E>,
        entity: &E,
    ) -> Result<()> {
        // Derive every index entry before touching the substrate so a bad
        // entity leaves the transaction unchanged.
        self.indexes.entries(entity)?;
        let payload = self.codec.encode(entity)?;
        txn.set(key, &payload)?;
        self.indexes.apply_update(txn, old, entity)
    }

    // === Primary Store ===

    /// Insert a new entity
    ///
    /// # Errors
    /// `AlreadyExists` in strict mode if a record exists at the primary key.
    pub fn create<T: Transaction + ?Sized>(&self, txn: &mut T, entity: &E) -> Result<()> {
        let pk = self.primary_key_of(entity)?;
        let key = self.records.pack(pk.values());

        let old = match txn.get(&key)? {
            Some(_) if self.create_mode == CreateMode::Strict => {
                return Err(Error::already_exists(self.schema.name(), &pk));
            }
            Some(bytes) => Some(self.codec.decode(&bytes)?),
            None => None,
        };

        self.write(txn, &key, old.as_ref(), entity)?;
        debug!(entity = self.schema.name(), pk = %pk, "created record");
        Ok(())
    }

    /// Fetch the entity at `pk`
    ///
    /// # Errors
    /// `NotFound` if no record exists.
    pub fn get<T: ReadTransaction + ?Sized>(&self, txn: &mut T, pk: &Tuple) -> Result<E> {
        self.find(txn, pk)?
            .ok_or_else(|| Error::not_found(self.schema.name(), pk))
    }

    /// Fetch the entity at `pk`, `None` if absent
    pub fn find<T: ReadTransaction + ?Sized>(&self, txn: &mut T, pk: &Tuple) -> Result<Option<E>> {
        let key = self.record_key(pk)?;
        self.load(txn, &key)
    }

    /// Check whether a record exists at `pk`
    pub fn exists<T: ReadTransaction + ?Sized>(&self, txn: &mut T, pk: &Tuple) -> Result<bool> {
        let key = self.record_key(pk)?;
        Ok(txn.get(&key)?.is_some())
    }

    /// Overwrite (or create) the entity at its primary key
    pub fn update<T: Transaction + ?Sized>(&self, txn: &mut T, entity: &E) -> Result<()> {
        let pk = self.primary_key_of(entity)?;
        let key = self.records.pack(pk.values());
        let old = self.load(txn, &key)?;

        self.write(txn, &key, old.as_ref(), entity)?;
        debug!(
            entity = self.schema.name(),
            pk = %pk,
            replaced = old.is_some(),
            "updated record"
        );
        Ok(())
    }

    /// Remove the entity at `pk` and every index entry derived from it
    ///
    /// Returns `false` if nothing was stored at `pk`.
    ///
    /// # Errors
    /// `Decoding` if the stored payload cannot be decoded; its index
    /// entries could not be located.
    pub fn delete<T: Transaction + ?Sized>(&self, txn: &mut T, pk: &Tuple) -> Result<bool> {
        let key = self.record_key(pk)?;
        let old = match self.load(txn, &key)? {
            Some(old) => old,
            None => return Ok(false),
        };

        self.indexes.apply_delete(txn, &old)?;
        txn.clear(&key)?;
        debug!(entity = self.schema.name(), pk = %pk, "deleted record");
        Ok(true)
    }

    /// Fetch several entities; keys without a record are omitted
    pub fn batch_get<'a, T, I>(&self, txn: &mut T, pks: I) -> Result<BTreeMap<Tuple, E>>
    where
        T: ReadTransaction + ?Sized,
        I: IntoIterator<Item = &'a Tuple>,
    {
        let mut found = BTreeMap::new();
        for pk in pks {
            if let Some(entity) = self.find(txn, pk)? {
                found.insert(pk.clone(), entity);
            }
        }
        Ok(found)
    }

    /// Every entity of this type in primary-key order
    pub fn scan<T: ReadTransaction + ?Sized>(
        &self,
        txn: &mut T,
        limit: Option<usize>,
    ) -> Result<Vec<(Tuple, E)>> {
        let (begin, end) = self.records.range()?;
        let kinds = self.schema.primary_key().kinds();

        txn.get_range(&begin, &end, limit)?
            .into_iter()
            .map(|(key, payload)| {
                let pk = codec::decode(self.records.unpack(&key)?, kinds)?;
                Ok((pk, self.codec.decode(&payload)?))
            })
            .collect()
    }

    // === Range Query Executor ===

    fn index_for_prefix(&self, index: &str, prefix: &Tuple) -> Result<(&IndexDef, &Subspace)> {
        let (def, space) = self.indexes.index(index).ok_or_else(|| {
            Error::invalid_operation(format!(
                "entity '{}' has no index '{}'",
                self.schema.name(),
                index
            ))
        })?;
        def.key()
            .check_prefix(&format!("index '{}'", index), prefix)?;
        Ok((def, space))
    }

    /// Primary keys whose index entries start with `prefix`, in index order
    pub fn query_keys<T: ReadTransaction + ?Sized>(
        &self,
        txn: &mut T,
        index: &str,
        prefix: &Tuple,
    ) -> Result<Vec<Tuple>> {
        let (def, space) = self.index_for_prefix(index, prefix)?;
        query::scan_primary_keys(txn, def, space, prefix, None)
    }

    /// Entities whose index entries start with `prefix`, in index order
    ///
    /// Entries pointing at missing records are skipped.
    pub fn query_by_index<T: ReadTransaction + ?Sized>(
        &self,
        txn: &mut T,
        index: &str,
        prefix: &Tuple,
    ) -> Result<Vec<E>> {
        self.query_inner(txn, index, prefix, None)
    }

    /// As [`query_by_index`](Self::query_by_index), scanning at most `limit`
    /// entries
    pub fn query_by_index_limit<T: ReadTransaction + ?Sized>(
        &self,
        txn: &mut T,
        index: &str,
        prefix: &Tuple,
        limit: usize,
    ) -> Result<Vec<E>> {
        self.query_inner(txn, index, prefix, Some(limit))
    }

    fn query_inner<T: ReadTransaction + ?Sized>(
        &self,
        txn: &mut T,
        index: &str,
        prefix: &Tuple,
        limit: Option<usize>,
    ) -> Result<Vec<E>> {
        let (def, space) = self.index_for_prefix(index, prefix)?;
        let pks = query::scan_primary_keys(txn, def, space, prefix, limit)?;

        let mut resolved = Vec::with_capacity(pks.len());
        for pk in pks {
            let key = self.records.pack(pk.values());
            resolved.push(match self.load(txn, &key)? {
                Some(entity) => Resolved::Found(entity),
                None => Resolved::StaleIndexReference(pk),
            });
        }
        Ok(query::collect_found(self.schema.name(), index, resolved))
    }

    // === Index maintenance ===

    /// Drop every index entry and regenerate them from the primary records
    ///
    /// Returns the number of entries written.
    pub fn rebuild_indexes<T: Transaction + ?Sized>(&self, txn: &mut T) -> Result<usize> {
        let removed = self.indexes.clear_all(txn)?;
        let mut written = 0;
        for (_, entity) in self.scan(txn, None)? {
            for entry in self.indexes.entries(&entity)? {
                txn.set(&entry.key, &[])?;
                written += 1;
            }
        }
        debug!(
            entity = self.schema.name(),
            removed,
            written,
            "rebuilt indexes"
        );
        Ok(written)
    }

    /// Compare index entries against the primary records without mutating
    pub fn verify_indexes<T: ReadTransaction + ?Sized>(&self, txn: &mut T) -> Result<IndexReport> {
        let records = self.scan(txn, None)?;

        let mut expected: BTreeSet<Vec<u8>> = BTreeSet::new();
        for (_, entity) in &records {
            expected.extend(self.indexes.entries(entity)?.into_iter().map(|e| e.key));
        }

        let mut report = IndexReport {
            records: records.len(),
            ..IndexReport::default()
        };

        for (def, space) in self.indexes.indexes() {
            let (begin, end) = space.range()?;
            let mut actual = BTreeSet::new();
            for (key, _) in txn.get_range(&begin, &end, None)? {
                report.entries += 1;
                if !expected.contains(&key) {
                    report.dangling.push(IndexIssue {
                        index: def.name().to_string(),
                        entry: codec::unpack(space.unpack(&key)?)?,
                    });
                }
                actual.insert(key);
            }
            for key in expected.iter().filter(|k| space.contains(k)) {
                if !actual.contains(key) {
                    report.missing.push(IndexIssue {
                        index: def.name().to_string(),
                        entry: codec::unpack(space.unpack(key)?)?,
                    });
                }
            }
        }

        Ok(report)
    }
}

impl<E, C> std::fmt::Debug for RecordStore<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("entity", &self.schema.name())
            .field("records", &self.records)
            .field("create_mode", &self.create_mode)
            .finish()
    }
}
