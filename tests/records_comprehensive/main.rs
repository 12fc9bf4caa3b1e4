//! Records Comprehensive Tests
//!
//! Scenario tests through the top-level crate: several entity types sharing
//! one database, registry-driven setup and concurrent clients.

mod common;

mod workload;
