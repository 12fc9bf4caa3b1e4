//! Schema registry
//!
//! Schemas are registered explicitly at startup. Registration is
//! idempotent: registering an identical schema again returns the existing
//! descriptor, while a different schema under a taken name is a
//! configuration error. Descriptors are immutable once registered.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use strata_core::{Error, Result};
use tracing::info;

use crate::config::RecordsConfig;
use crate::entity::{Entity, EntityCodec};
use crate::schema::EntitySchema;
use crate::store::RecordStore;

/// Registered entity schemas, keyed by entity name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<BTreeMap<String, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    ///
    /// # Errors
    /// `Configuration` if a different schema is already registered under
    /// the same entity name.
    pub fn register(&self, schema: EntitySchema) -> Result<Arc<EntitySchema>> {
        let mut schemas = self.schemas.write();
        if let Some(existing) = schemas.get(schema.name()) {
            if **existing == schema {
                return Ok(Arc::clone(existing));
            }
            return Err(Error::configuration(format!(
                "entity '{}' is already registered with a different schema",
                schema.name()
            )));
        }

        info!(
            entity = schema.name(),
            fields = schema.fields().len(),
            indexes = schema.indexes().len(),
            "registered entity schema"
        );
        let schema = Arc::new(schema);
        schemas.insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Look up a schema by entity name
    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.read().get(name).cloned()
    }

    /// All registered schemas in name order
    pub fn schemas(&self) -> Vec<Arc<EntitySchema>> {
        self.schemas.read().values().cloned().collect()
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Build a store for a registered entity type
    ///
    /// # Errors
    /// `Configuration` if `name` is not registered or `config` is invalid.
    pub fn store<E, C>(&self, name: &str, codec: C, config: &RecordsConfig) -> Result<RecordStore<E, C>>
    where
        E: Entity,
        C: EntityCodec<E>,
    {
        let schema = self
            .get(name)
            .ok_or_else(|| Error::configuration(format!("entity '{}' is not registered", name)))?;
        RecordStore::new(schema, codec, config)
    }
}
