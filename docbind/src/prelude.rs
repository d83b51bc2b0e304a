//! Convenient re-exports of commonly used types from docbind.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docbind::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document store handle and collection bindings
//! - Documents and their field maps
//! - Store backends and builders
//! - Criteria construction, result lists, and schemas
//! - Error types

pub use docbind_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, IndexOrder},
    criteria::Criteria,
    document::Document,
    error::{DocBindError, DocBindResult},
    fields::FieldMap,
    results::ResultList,
    schema::{FieldSpec, FieldType, Schema},
    store::DocumentStore,
};
