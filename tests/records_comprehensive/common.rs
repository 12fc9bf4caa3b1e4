//! Shared fixtures for the comprehensive suite.

#![allow(dead_code)]

use std::sync::Once;

use strata_records_db::{EntitySchema, Error, Result, ScalarKind, SchemaRegistry};

static INIT_TRACING: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Registry with the `customer` and `order` entity types.
pub fn shop_registry() -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::new();
    registry.register(
        EntitySchema::builder("customer")
            .field("id", ScalarKind::U32)
            .field("email", ScalarKind::String)
            .field("tier", ScalarKind::String)
            .primary_key(["id"])
            .index(["email"])
            .index(["tier"])
            .build()?,
    )?;
    registry.register(
        EntitySchema::builder("order")
            .field("customer", ScalarKind::U32)
            .field("seq", ScalarKind::U64)
            .field("total", ScalarKind::I64)
            .field("paid", ScalarKind::Bool)
            .field("lines", ScalarKind::Bytes)
            .primary_key(["customer", "seq"])
            .index(["paid", "total"])
            .index(["customer"])
            .build()?,
    )?;
    Ok(registry)
}

/// Retry `f` until it commits or fails with something other than a conflict.
pub fn with_retry<T>(mut f: impl FnMut() -> Result<T>) -> Result<T> {
    loop {
        match f() {
            Err(Error::TransactionConflict { .. }) => continue,
            other => return other,
        }
    }
}
