//! Entity schema descriptors
//!
//! An [`EntitySchema`] describes one entity type: its fields and their
//! [`ScalarKind`]s, the ordered primary key, and zero or more secondary
//! indexes. Kinds are resolved once in [`EntitySchemaBuilder::build`]; the
//! store never inspects field types again.
//!
//! ## Validation
//!
//! `build()` rejects, with `Error::Configuration`:
//! - an empty entity name or an entity without fields
//! - duplicate field names
//! - an empty primary key, or one naming an unknown or repeated field
//! - an empty index, or one naming an unknown or repeated field
//! - two indexes with the same composite name

use std::collections::BTreeSet;

use strata_core::{Error, Result, Scalar, ScalarKind, Tuple};

use crate::entity::Entity;

/// Separator between field names in a composite index name
pub const INDEX_NAME_SEPARATOR: &str = "_and_";

/// One declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    kind: ScalarKind,
}

impl FieldDef {
    /// Create a field definition
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        FieldDef {
            name: name.into(),
            kind,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }
}

/// Ordered, non-empty list of fields with their resolved kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFields {
    fields: Vec<String>,
    kinds: Vec<ScalarKind>,
}

impl KeyFields {
    /// Field names in key order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field kinds in key order
    pub fn kinds(&self) -> &[ScalarKind] {
        &self.kinds
    }

    /// Number of key fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a built schema
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Extract this key's values from an entity
    ///
    /// # Errors
    /// `Encoding` if the entity omits a field or supplies a value of the
    /// wrong kind.
    pub fn extract<E: Entity + ?Sized>(&self, entity_name: &str, entity: &E) -> Result<Tuple> {
        self.fields
            .iter()
            .zip(&self.kinds)
            .map(|(field, kind)| {
                let value = entity.field(field).ok_or_else(|| {
                    Error::encoding(format!("{} has no value for field '{}'", entity_name, field))
                })?;
                if value.kind() != *kind {
                    return Err(Error::encoding(format!(
                        "{}.{} is declared {} but the entity supplied {}",
                        entity_name,
                        field,
                        kind,
                        value.kind()
                    )));
                }
                Ok(value)
            })
            .collect::<Result<Vec<Scalar>>>()
            .map(Tuple::from)
    }

    /// Check that `values` is a prefix of this key (kind by kind)
    ///
    /// # Errors
    /// `InvalidOperation` if `values` is longer than the key or any kind
    /// differs.
    pub fn check_prefix(&self, what: &str, values: &Tuple) -> Result<()> {
        if values.len() > self.len() {
            return Err(Error::invalid_operation(format!(
                "{} takes at most {} value(s), got {}",
                what,
                self.len(),
                values.len()
            )));
        }
        for (position, (value, kind)) in values.values().iter().zip(&self.kinds).enumerate() {
            if value.kind() != *kind {
                return Err(Error::invalid_operation(format!(
                    "{} value {} ('{}') must be {}, got {}",
                    what,
                    position,
                    self.fields[position],
                    kind,
                    value.kind()
                )));
            }
        }
        Ok(())
    }

    /// Check that `values` is a complete key
    pub fn check_complete(&self, what: &str, values: &Tuple) -> Result<()> {
        if values.len() != self.len() {
            return Err(Error::invalid_operation(format!(
                "{} takes exactly {} value(s), got {}",
                what,
                self.len(),
                values.len()
            )));
        }
        self.check_prefix(what, values)
    }
}

/// Secondary index definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    name: String,
    key: KeyFields,
    entry_kinds: Vec<ScalarKind>,
}

impl IndexDef {
    /// Composite name, e.g. `name_and_age`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed fields in declaration order
    pub fn fields(&self) -> &[String] {
        self.key.fields()
    }

    /// Indexed fields with kinds
    pub fn key(&self) -> &KeyFields {
        &self.key
    }

    /// Kinds of a full index entry: indexed fields then primary-key fields
    pub fn entry_kinds(&self) -> &[ScalarKind] {
        &self.entry_kinds
    }
}

/// Composite index name for an ordered field list
pub fn composite_index_name<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(INDEX_NAME_SEPARATOR)
}

/// Immutable description of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldDef>,
    primary_key: KeyFields,
    indexes: Vec<IndexDef>,
}

impl EntitySchema {
    /// Start building a schema for entity type `name`
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Entity type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Primary key
    pub fn primary_key(&self) -> &KeyFields {
        &self.primary_key
    }

    /// Secondary indexes in declaration order
    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// Look up an index by composite name
    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Primary-key tuple of `entity`
    pub fn primary_key_of<E: Entity + ?Sized>(&self, entity: &E) -> Result<Tuple> {
        self.primary_key.extract(&self.name, entity)
    }
}

/// Builder for [`EntitySchema`]
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
    primary_key: Vec<String>,
    indexes: Vec<Vec<String>>,
}

impl EntitySchemaBuilder {
    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields.push(FieldDef::new(name, kind));
        self
    }

    /// Declare the primary key (ordered)
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a secondary index (ordered)
    pub fn index<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Validate and build the schema
    pub fn build(self) -> Result<EntitySchema> {
        if self.name.is_empty() {
            return Err(Error::configuration("entity name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(Error::configuration(format!(
                "entity '{}' declares no fields",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(Error::configuration(format!(
                    "entity '{}' has a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::configuration(format!(
                    "entity '{}' declares field '{}' twice",
                    self.name, field.name
                )));
            }
        }

        let primary_key = self.resolve_key("primary key", &self.primary_key)?;

        let mut indexes: Vec<IndexDef> = Vec::with_capacity(self.indexes.len());
        for fields in &self.indexes {
            let name = composite_index_name(fields);
            let key = self.resolve_key(&format!("index '{}'", name), fields)?;
            if indexes.iter().any(|existing| existing.name == name) {
                return Err(Error::configuration(format!(
                    "entity '{}' declares index '{}' twice",
                    self.name, name
                )));
            }
            let entry_kinds = key
                .kinds()
                .iter()
                .chain(primary_key.kinds())
                .copied()
                .collect();
            indexes.push(IndexDef {
                name,
                key,
                entry_kinds,
            });
        }

        Ok(EntitySchema {
            name: self.name,
            fields: self.fields,
            primary_key,
            indexes,
        })
    }

    fn resolve_key(&self, what: &str, fields: &[String]) -> Result<KeyFields> {
        if fields.is_empty() {
            return Err(Error::configuration(format!(
                "{} of entity '{}' must name at least one field",
                what, self.name
            )));
        }

        let mut kinds = Vec::with_capacity(fields.len());
        let mut seen = BTreeSet::new();
        for name in fields {
            let def = self
                .fields
                .iter()
                .find(|f| &f.name == name)
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "{} of entity '{}' references unknown field '{}'",
                        what, self.name, name
                    ))
                })?;
            if !seen.insert(name.as_str()) {
                return Err(Error::configuration(format!(
                    "{} of entity '{}' repeats field '{}'",
                    what, self.name, name
                )));
            }
            kinds.push(def.kind);
        }

        Ok(KeyFields {
            fields: fields.to_vec(),
            kinds,
        })
    }
}
