//! In-memory storage implementation for the binding layer.
//!
//! This module provides a simple in-memory backend that stores records as BSON
//! documents behind an async-safe read-write lock. Collections preserve
//! insertion order, so query results come back in the order records were
//! written.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use indexmap::IndexMap;
use mea::rwlock::RwLock;

use docbind_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocBindError, DocBindResult},
};

use crate::evaluator::FilterMatcher;

type CollectionMap = IndexMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// multiple clones share the same underlying data across async tasks. Records
/// are full BSON documents, `_id` included, keyed by the hex form of their
/// identity in insertion order.
///
/// Queries scan the whole collection; index creation only records the index
/// name (exposed through [`index_names`](Self::index_names) so tests can
/// observe it).
///
/// # Example
///
/// ```ignore
/// use docbind_memory::InMemoryStore;
/// use docbind::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_one("users", doc! { "name": "Alice" }).await?;
/// let record = store.find_one("users", doc! { "_id": id }, None).await?;
/// assert!(record.is_some());
/// # Ok::<(), docbind::error::DocBindError>(())
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> (id hex -> record)
    store: Arc<RwLock<StoreMap>>,
    /// collection name -> created index names
    indexes: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the names of the indexes created on a collection, in creation
    /// order.
    pub async fn index_names(&self, collection: &str) -> Vec<String> {
        self.indexes
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn apply_update(record: &mut Document, update: &Document) -> DocBindResult<()> {
        for (op, changes) in update {
            let changes = changes.as_document().ok_or_else(|| {
                DocBindError::Backend(format!("update operator {op} expects a document"))
            })?;

            match op.as_str() {
                "$set" => {
                    for (field, value) in changes {
                        record.insert(field.clone(), value.clone());
                    }
                }
                "$unset" => {
                    for (field, _) in changes {
                        record.remove(field);
                    }
                }
                other => {
                    return Err(DocBindError::Backend(format!(
                        "unsupported update operator: {other}"
                    )));
                }
            }
        }

        Ok(())
    }

    fn project(record: &Document, projection: &Document) -> Document {
        let mut projected = Document::new();
        if let Some(id) = record.get("_id") {
            projected.insert("_id", id.clone());
        }
        for (field, include) in projection {
            let included = match include {
                Bson::Int32(n) => *n != 0,
                Bson::Int64(n) => *n != 0,
                Bson::Boolean(b) => *b,
                _ => true,
            };
            if included {
                if let Some(value) = record.get(field) {
                    projected.insert(field.clone(), value.clone());
                }
            }
        }
        projected
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DocBindResult<Option<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(None);
        };

        for record in collection_map.values() {
            if FilterMatcher::matches(&filter, record)? {
                return Ok(Some(match &projection {
                    Some(projection) => Self::project(record, projection),
                    None => record.clone(),
                }));
            }
        }

        Ok(None)
    }

    async fn find(&self, collection: &str, filter: Document) -> DocBindResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matches = Vec::new();
        for record in collection_map.values() {
            if FilterMatcher::matches(&filter, record)? {
                matches.push(record.clone());
            }
        }

        Ok(matches)
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocBindResult<ObjectId> {
        let mut store = self.store.write().await;
        let collection_map = store.entry(collection.to_string()).or_default();

        let id = ObjectId::new();
        let mut stored = Document::new();
        stored.insert("_id", id);
        for (field, value) in record {
            stored.insert(field, value);
        }
        collection_map.insert(id.to_hex(), stored);

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DocBindResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        for record in collection_map.values_mut() {
            if FilterMatcher::matches(&filter, record)? {
                Self::apply_update(record, &update)?;
                return Ok(1);
            }
        }

        Ok(0)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> DocBindResult<()> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(());
        };

        let mut target = None;
        for (key, record) in collection_map.iter() {
            if FilterMatcher::matches(&filter, record)? {
                target = Some(key.clone());
                break;
            }
        }

        if let Some(key) = target {
            collection_map.shift_remove(&key);
        }

        Ok(())
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> DocBindResult<()> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(());
        };

        let mut targets = Vec::new();
        for (key, record) in collection_map.iter() {
            if FilterMatcher::matches(&filter, record)? {
                targets.push(key.clone());
            }
        }

        for key in targets {
            collection_map.shift_remove(&key);
        }

        Ok(())
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> DocBindResult<u64> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(0);
        };

        let mut count = 0;
        for record in collection_map.values() {
            if FilterMatcher::matches(&filter, record)? {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn create_index(
        &self,
        collection: &str,
        _keys: Document,
        name: &str,
        _unique: bool,
    ) -> DocBindResult<()> {
        // No real indexing; remember the name so callers can observe creation.
        let mut indexes = self.indexes.write().await;
        let names = indexes.entry(collection.to_string()).or_default();
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance. Always succeeds.
    async fn build(self) -> DocBindResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
