//! Collection bindings: the bridge between documents and a named collection.
//!
//! A [`Collection`] couples a collection name, a borrowed backend, and an
//! optional [`Schema`]. It is the static replacement for runtime class
//! synthesis: instead of generating a typed class per collection, callers hold
//! a `Collection` value (built once from the [`DocumentStore`]) and construct
//! bound [`Document`]s through it.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

use std::str::FromStr;

use bson::{Bson, doc, oid::ObjectId};
use log::warn;

use crate::backend::StoreBackend;
use crate::changes::ChangeTracker;
use crate::criteria::Criteria;
use crate::document::Document;
use crate::error::{DocBindError, DocBindResult};
use crate::fields::FieldMap;
use crate::results::ResultList;
use crate::schema::Schema;

/// Sort order of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    Ascending,
    Descending,
}

impl IndexOrder {
    /// The direction value used in index key specifications.
    pub fn direction(&self) -> i32 {
        match self {
            IndexOrder::Ascending => 1,
            IndexOrder::Descending => -1,
        }
    }

    /// The suffix used in default index names.
    pub fn suffix(&self) -> &'static str {
        match self {
            IndexOrder::Ascending => "asc",
            IndexOrder::Descending => "desc",
        }
    }
}

impl FromStr for IndexOrder {
    type Err = DocBindError;

    fn from_str(value: &str) -> DocBindResult<Self> {
        match value {
            "asc" => Ok(IndexOrder::Ascending),
            "desc" => Ok(IndexOrder::Descending),
            other => Err(DocBindError::InvalidIndex(format!(
                "order must be \"asc\" or \"desc\", got \"{other}\""
            ))),
        }
    }
}

/// A named collection binding with an optional schema.
///
/// # Example
///
/// ```ignore
/// use docbind::store::DocumentStore;
/// use bson::doc;
///
/// let store = DocumentStore::new(backend);
/// let users = store.collection("users");
///
/// let mut alice = users.create(doc! { "name": "Alice", "age": 30 })?;
/// alice.save().await?;
/// # Ok::<(), docbind::error::DocBindError>(())
/// ```
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
    schema: Option<Schema>,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B, schema: Option<Schema>) -> Self {
        Self { name, backend, schema }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema attached to this binding, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub(crate) fn backend(&self) -> &'a B {
        self.backend
    }

    pub(crate) fn tracker(&self) -> ChangeTracker<'_, B> {
        ChangeTracker::new(self.backend, &self.name)
    }

    /// Constructs a new in-memory document bound to this collection.
    ///
    /// If the field map carries an `_id` entry it is extracted into the
    /// document identity; a malformed identity fails with
    /// [`DocBindError::InvalidId`]. The document is not persisted until
    /// [`Document::save`] is called.
    pub fn create(&'a self, fields: impl Into<FieldMap>) -> DocBindResult<Document<'a, B>> {
        let mut fields = fields.into();
        let id = match fields.remove("_id") {
            None | Some(Bson::Null) => None,
            Some(Bson::ObjectId(oid)) => Some(oid),
            Some(Bson::String(raw)) => Some(
                ObjectId::parse_str(&raw).map_err(|_| DocBindError::InvalidId(raw))?,
            ),
            Some(other) => return Err(DocBindError::InvalidId(other.to_string())),
        };

        Ok(Document::bound(self, id, fields))
    }

    pub(crate) fn from_record(
        &'a self,
        mut record: bson::Document,
    ) -> DocBindResult<Document<'a, B>> {
        let id = match record.remove("_id") {
            Some(Bson::ObjectId(oid)) => Some(oid),
            None => None,
            Some(other) => return Err(DocBindError::InvalidId(other.to_string())),
        };

        Ok(Document::bound(self, id, FieldMap::from(record)))
    }

    /// Fetches a document by the hex form of its identity.
    ///
    /// Returns `Ok(None)` both when the identity string is malformed and when
    /// no record carries that identity; a malformed id is not an error here,
    /// unlike in [`create`](Self::create).
    pub async fn get_by_id(&'a self, id: &str) -> DocBindResult<Option<Document<'a, B>>> {
        let Ok(id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        match self
            .backend
            .find_one(&self.name, doc! { "_id": id }, None)
            .await?
        {
            Some(record) => Ok(Some(self.from_record(record)?)),
            None => Ok(None),
        }
    }

    /// Finds all documents matching `criteria`, in store iteration order.
    pub async fn find(
        &'a self,
        criteria: impl Into<Criteria>,
    ) -> DocBindResult<ResultList<Document<'a, B>>> {
        self.backend
            .find(&self.name, criteria.into().into_filter())
            .await?
            .into_iter()
            .map(|record| self.from_record(record))
            .collect()
    }

    /// Finds all documents whose `field` value is a member of `values`.
    pub async fn find_in(
        &'a self,
        field: &str,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> DocBindResult<ResultList<Document<'a, B>>> {
        self.find(Criteria::field_in(field, values)).await
    }

    /// Deletes every record matching `criteria`.
    pub async fn delete_many(&self, criteria: impl Into<Criteria>) -> DocBindResult<()> {
        self.backend
            .delete_many(&self.name, criteria.into().into_filter())
            .await
    }

    /// Constructs and saves a document for each item, best-effort.
    ///
    /// An item that fails to construct or save is logged and skipped; the
    /// operation as a whole never fails.
    pub async fn insert_many(&'a self, items: Vec<FieldMap>) {
        for item in items {
            let saved = match self.create(item.clone()) {
                Ok(mut document) => document.save().await,
                Err(err) => Err(err),
            };

            if let Err(err) = saved {
                warn!(
                    "Skipping item in bulk insert into '{}': {err} (item: {:?})",
                    self.name,
                    item.as_document()
                );
            }
        }
    }

    /// Returns the total number of records in the collection, unfiltered.
    pub async fn document_count(&self) -> DocBindResult<u64> {
        self.backend
            .count_documents(&self.name, bson::Document::new())
            .await
    }

    /// Creates an index over `keys` in the given order.
    ///
    /// `keys` must be non-empty. When `name` is `None` the index name defaults
    /// to the keys joined with underscores plus the order suffix, for example
    /// `name_age_asc`.
    pub async fn create_index(
        &self,
        keys: &[&str],
        order: IndexOrder,
        unique: bool,
        name: Option<&str>,
    ) -> DocBindResult<()> {
        if keys.is_empty() {
            return Err(DocBindError::InvalidIndex(
                "keys must be a non-empty list of field names".into(),
            ));
        }

        let default_name = format!("{}_{}", keys.join("_"), order.suffix());
        let spec = keys
            .iter()
            .map(|key| (key.to_string(), Bson::Int32(order.direction())))
            .collect();

        self.backend
            .create_index(&self.name, spec, name.unwrap_or(&default_name), unique)
            .await
    }
}
