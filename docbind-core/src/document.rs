//! The document aggregate: identity, field map, and collection binding.
//!
//! A [`Document`] is the unit of persistence. It couples a nullable identity
//! (assigned by the store on first insert), an ordered [`FieldMap`], and an
//! optional [`Collection`] binding. The save path is driven by the change
//! tracker: a document with an identity writes back only the fields that
//! diverged from the stored record.

use bson::{Bson, doc, oid::ObjectId};
use log::{error, info};
use serde_json::Value;

use crate::backend::StoreBackend;
use crate::collection::Collection;
use crate::error::{DocBindError, DocBindResult};
use crate::fields::{FieldMap, bson_to_json};

/// An in-memory document, optionally bound to a collection.
///
/// Lifecycle: created in memory with no identity, assigned one by the store on
/// the first [`save`](Self::save), partially updated on later saves, and left
/// intact in memory after [`delete`](Self::delete).
///
/// # Example
///
/// ```ignore
/// use bson::doc;
///
/// let users = store.collection("users");
/// let mut user = users.create(doc! { "name": "Alice", "age": 30 })?;
/// user.save().await?;                 // insert, identity assigned
/// user.set("age", 31);
/// user.save().await?;                 // partial update of `age` only
/// # Ok::<(), docbind::error::DocBindError>(())
/// ```
#[derive(Debug)]
pub struct Document<'a, B: StoreBackend> {
    binding: Option<&'a Collection<'a, B>>,
    id: Option<ObjectId>,
    fields: FieldMap,
}

impl<'a, B: StoreBackend> Clone for Document<'a, B> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding,
            id: self.id,
            fields: self.fields.clone(),
        }
    }
}

impl<'a, B: StoreBackend> Document<'a, B> {
    pub(crate) fn bound(
        binding: &'a Collection<'a, B>,
        id: Option<ObjectId>,
        fields: FieldMap,
    ) -> Self {
        Self { binding: Some(binding), id, fields }
    }

    /// Constructs a document with no collection binding.
    ///
    /// Detached documents are plain value holders: every persistence operation
    /// on them fails with [`DocBindError::CollectionMissing`].
    pub fn detached(fields: impl Into<FieldMap>) -> Self {
        Self { binding: None, id: None, fields: fields.into() }
    }

    /// The store-assigned identity, or `None` if this document was never saved.
    ///
    /// A non-`None` identity means the document has at some point been written
    /// under that identity; the backing record may since have been deleted
    /// out-of-band.
    pub fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    /// The name of the bound collection, if any.
    pub fn collection_name(&self) -> Option<&str> {
        self.binding.map(|b| b.name())
    }

    /// Borrows the field map.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Mutably borrows the field map.
    pub fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }

    /// Returns a field value, if present.
    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.fields.get(name)
    }

    /// Sets a field in memory. The change reaches the store on the next save.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Bson>) {
        self.fields.insert(name, value);
    }

    /// Collapses this document to a plain BSON value for embedding in another
    /// document's field map. The identity, if any, is carried along under
    /// `_id`.
    pub fn to_embedded(&self) -> Bson {
        let mut record = bson::Document::new();
        if let Some(id) = &self.id {
            record.insert("_id", *id);
        }
        for (name, value) in self.fields.iter() {
            record.insert(name.clone(), value.clone());
        }
        Bson::Document(record)
    }

    fn binding(&self) -> DocBindResult<&'a Collection<'a, B>> {
        self.binding.ok_or(DocBindError::CollectionMissing)
    }

    /// Returns the fields whose in-memory value diverges from the stored
    /// record, mapped to their in-memory values.
    ///
    /// Empty for a document without an identity or without a binding, and,
    /// as a documented sharp edge, after a backing-store read failure, which
    /// is logged rather than raised.
    pub async fn changed_fields(&self) -> bson::Document {
        match self.binding {
            Some(binding) => {
                binding
                    .tracker()
                    .changed_fields(self.id.as_ref(), &self.fields)
                    .await
            }
            None => bson::Document::new(),
        }
    }

    /// Returns `true` when no field diverges from the stored record.
    ///
    /// An unsaved document reports `false` unless its field map is empty; that
    /// empty case is a documented conflation with "fully persisted". A
    /// detached document behaves the same way.
    pub async fn is_saved(&self) -> bool {
        match self.binding {
            Some(binding) => {
                binding
                    .tracker()
                    .is_saved(self.id.as_ref(), &self.fields)
                    .await
            }
            None => self.fields.is_empty(),
        }
    }

    /// Persists this document.
    ///
    /// Runs schema validation first when the binding carries a schema; a
    /// validation failure aborts before any store mutation. A document without
    /// an identity is inserted whole and the store-assigned identity is
    /// captured. A document with an identity writes a `$set` partial update of
    /// the changed fields only, or nothing at all when no field changed.
    ///
    /// # Errors
    ///
    /// [`DocBindError::CollectionMissing`] on a detached document,
    /// [`DocBindError::Validation`]/[`DocBindError::FieldNotInSchema`] on
    /// schema violations, and [`DocBindError::NotFound`] when the identity no
    /// longer exists server-side.
    pub async fn save(&mut self) -> DocBindResult<()> {
        let binding = self.binding()?;

        if let Some(schema) = binding.schema() {
            schema.validate(&self.fields)?;
        }

        match &self.id {
            None => {
                let id = binding
                    .backend()
                    .insert_one(binding.name(), self.fields.as_document().clone())
                    .await?;
                self.id = Some(id);
                Ok(())
            }
            Some(id) => {
                let changed = self.changed_fields().await;
                if changed.is_empty() {
                    return Ok(());
                }

                let matched = binding
                    .backend()
                    .update_one(binding.name(), doc! { "_id": *id }, doc! { "$set": changed })
                    .await?;
                if matched == 0 {
                    return Err(DocBindError::NotFound(
                        id.to_hex(),
                        binding.name().to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Replaces the in-memory field map with the authoritative stored state.
    ///
    /// Nested mapping values come back as plain nested field maps; they are
    /// not rehydrated into bound documents.
    ///
    /// # Errors
    ///
    /// Fails on a detached or never-saved document, and with
    /// [`DocBindError::NotFound`] when the record vanished server-side.
    pub async fn reload(&mut self) -> DocBindResult<()> {
        let binding = self.binding()?;
        let Some(id) = &self.id else {
            return Err(DocBindError::UnsavedDocument("reload"));
        };

        let record = binding
            .backend()
            .find_one(binding.name(), doc! { "_id": *id }, None)
            .await?
            .ok_or_else(|| DocBindError::NotFound(id.to_hex(), binding.name().to_string()))?;

        let mut fields = FieldMap::new();
        for (name, value) in record {
            if name != "_id" {
                fields.insert(name, value);
            }
        }
        self.fields = fields;
        Ok(())
    }

    /// Best-effort removal of a single field from the stored record.
    ///
    /// Failures are logged, never raised, and the in-memory field stays put
    /// regardless of the outcome; keeping memory and store in sync on this
    /// path is the caller's responsibility.
    pub async fn delete_field(&self, field: &str) {
        let Some(binding) = self.binding else {
            error!("Cannot delete field '{field}': document is not bound to a collection");
            return;
        };
        let Some(id) = &self.id else {
            error!("Cannot delete field '{field}': document was never saved");
            return;
        };

        match binding
            .backend()
            .update_one(binding.name(), doc! { "_id": *id }, doc! { "$unset": { field: "" } })
            .await
        {
            Ok(_) => info!("Field '{field}' deleted from document {}", id.to_hex()),
            Err(err) => error!(
                "Error deleting field '{field}' from document {}: {err}",
                id.to_hex()
            ),
        }
    }

    /// Removes the backing record.
    ///
    /// The in-memory document keeps its last-known field map and, notably, its
    /// identity; this is intentional and relied upon by callers that inspect a
    /// document after deleting it.
    pub async fn delete(&self) -> DocBindResult<()> {
        let binding = self.binding()?;
        let Some(id) = &self.id else {
            return Err(DocBindError::UnsavedDocument("delete"));
        };

        binding
            .backend()
            .delete_one(binding.name(), doc! { "_id": *id })
            .await
    }

    /// Converts this document to a pure JSON tree.
    ///
    /// The identity, if present, appears first under `_id` in its hex string
    /// form; timestamps become fractional epoch seconds, recursively. This is
    /// a side-effect-free transform.
    pub fn to_json_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        if let Some(id) = &self.id {
            object.insert("_id".to_string(), Value::String(id.to_hex()));
        }
        for (name, value) in self.fields.iter() {
            object.insert(name.clone(), bson_to_json(value));
        }
        Value::Object(object)
    }

    /// Serializes this document to a JSON string via
    /// [`to_json_value`](Self::to_json_value).
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }
}
