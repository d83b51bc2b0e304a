//! Main docbind crate providing a unified interface for document binding.
//!
//! This crate is the primary entry point for users of the docbind framework.
//! It re-exports the core types and functionality from various sub-crates and
//! provides convenient access to different storage backends.
//!
//! # Features
//!
//! - **Schema-less documents** - Identity plus an ordered field map, no struct required
//! - **Per-field change tracking** - Saves write only the fields that actually changed
//! - **Optional schemas** - Per-collection field descriptors with type and custom validation
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
//! - **Result list helpers** - Filter, map, reduce, group, and sample query results
//!
//! # Quick Start
//!
//! ```ignore
//! use docbind::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let users = store.collection("users");
//!
//!     // Create and persist a document.
//!     let mut user = users.create(doc! { "name": "Alice", "age": 30 })?;
//!     user.save().await?;
//!     assert!(user.id().is_some());
//!
//!     // Only the changed field is written back.
//!     user.set("age", 31);
//!     user.save().await?;
//!
//!     // Query by equality criteria.
//!     let results = users.find(doc! { "name": "Alice" }).await?;
//!     println!("found {} users", results.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Schemas
//!
//! Collections can optionally carry a schema that every save validates
//! against:
//!
//! ```ignore
//! use docbind::{prelude::*, memory::InMemoryStore, schema::{FieldSpec, FieldType, Schema}};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = Schema::new()
//!         .field("name", FieldSpec::required(FieldType::String))
//!         .field("age", FieldSpec::optional(FieldType::Int));
//!
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let users = store.collection_with_schema("users", schema);
//!
//!     // Fails validation: `name` is required.
//!     let mut user = users.create(doc! { "age": 30 })?;
//!     assert!(user.save().await.is_err());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use docbind_core::{
    backend, changes, collection, criteria, document, error, fields, results, schema, store,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docbind_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docbind_mongodb::{
        CONNECTION_STRING_VAR, DATABASE_NAME_VAR, MongoStore, MongoStoreBuilder,
    };
}
