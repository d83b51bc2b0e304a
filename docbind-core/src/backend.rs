//! Storage backend abstraction for bound collections.
//!
//! This module defines the trait that abstracts over concrete storage clients,
//! allowing the binding layer to work against an in-memory store in tests and a
//! real document database in production.
//!
//! The interface is filter-oriented rather than id-oriented: every read and
//! write addresses records through a BSON filter document, which is exactly the
//! shape the change tracker and collection operations produce.
//!
//! # Example
//!
//! ```ignore
//! use docbind::backend::StoreBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = backend
//!     .insert_one("users", doc! { "name": "Alice", "age": 30 })
//!     .await?;
//! let record = backend
//!     .find_one("users", doc! { "_id": id }, None)
//!     .await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::error::DocBindResult;

/// Abstract interface for document storage backends.
///
/// Implementers provide the handful of primitive operations the binding layer
/// needs: filtered point reads (with optional projection, used by the change
/// tracker), filtered scans, single-record inserts and partial updates, bulk
/// and single deletes, counting, and index creation. Everything else (pooling,
/// transport, timeouts) stays inside the implementation.
///
/// All implementations must be thread-safe (`Send + Sync`) and support
/// concurrent access from multiple async tasks.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Finds a single record matching `filter` in `collection`.
    ///
    /// When `projection` is supplied, only the projected fields (plus `_id`)
    /// are returned. Returns `Ok(None)` when no record matches.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DocBindResult<Option<Document>>;

    /// Finds all records matching `filter` in `collection`, in store iteration
    /// order. An empty filter matches every record.
    async fn find(&self, collection: &str, filter: Document) -> DocBindResult<Vec<Document>>;

    /// Inserts a single record and returns the store-assigned identity.
    ///
    /// The record must not carry an `_id` key; the backend assigns one.
    /// The collection is created automatically if it does not exist.
    async fn insert_one(&self, collection: &str, record: Document) -> DocBindResult<ObjectId>;

    /// Applies a partial update (`$set`/`$unset`) to the first record matching
    /// `filter` and returns the number of matched records (0 or 1).
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DocBindResult<u64>;

    /// Deletes the first record matching `filter`. Deleting with a filter that
    /// matches nothing is not an error.
    async fn delete_one(&self, collection: &str, filter: Document) -> DocBindResult<()>;

    /// Deletes every record matching `filter`.
    async fn delete_many(&self, collection: &str, filter: Document) -> DocBindResult<()>;

    /// Counts the records matching `filter`. An empty filter counts the whole
    /// collection.
    async fn count_documents(&self, collection: &str, filter: Document) -> DocBindResult<u64>;

    /// Creates a named index over the given key specification.
    ///
    /// `keys` maps field names to a direction value (1 for ascending, -1 for
    /// descending), in index key order.
    async fn create_index(
        &self,
        collection: &str,
        keys: Document,
        name: &str,
        unique: bool,
    ) -> DocBindResult<()>;
}

/// Factory trait for fallible backend construction.
///
/// Builders encapsulate connection bootstrap (parsing connection strings,
/// retrying, verifying connectivity) so that a constructed backend is known to
/// be usable.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocBindResult<Self::Backend>;
}
