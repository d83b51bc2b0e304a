//! A document-database mapping layer with per-field change tracking.
//!
//! This crate is the core of the docbind project and provides:
//!
//! - **Field maps** ([`fields`]) - The ordered in-memory state of one document
//! - **Change tracking** ([`changes`]) - Minimal changed-field computation against the store
//! - **Documents** ([`document`]) - Identity + field map + binding, with save/reload/delete
//! - **Collection bindings** ([`collection`]) - Named collections with optional schemas
//! - **Criteria** ([`criteria`]) - Query criteria normalization
//! - **Schemas** ([`schema`]) - Per-collection field descriptors and validation
//! - **Result lists** ([`results`]) - List-like helpers over materialized query results
//! - **Store backend abstraction** ([`backend`]) - Traits for storage implementations
//! - **Store handle** ([`store`]) - The explicit, non-global connection value
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docbind_core::store::DocumentStore;
//! use bson::doc;
//!
//! let store = DocumentStore::new(backend);
//! let users = store.collection("users");
//!
//! let mut user = users.create(doc! { "name": "Alice", "age": 30 })?;
//! user.save().await?;
//! assert!(user.id().is_some());
//!
//! user.set("age", 31);
//! user.save().await?;   // writes only `age`
//! # Ok::<(), docbind_core::error::DocBindError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbind_core;

pub mod backend;
pub mod changes;
pub mod collection;
pub mod criteria;
pub mod document;
pub mod error;
pub mod fields;
pub mod results;
pub mod schema;
pub mod store;
