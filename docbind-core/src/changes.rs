//! Per-field change tracking between in-memory and stored document state.
//!
//! The tracker re-reads each field's stored value through a projected point
//! read and compares it to the in-memory value. Comparison is by value with
//! numeric widths normalized, so a driver returning `Int64` where `Int32` was
//! written does not produce a phantom change.

use bson::{Bson, Document, doc, oid::ObjectId};
use log::error;

use crate::backend::StoreBackend;
use crate::fields::FieldMap;

/// Computes the minimal changed-field set for one collection.
///
/// A tracker borrows the backend and collection name of a binding; the
/// document's own `changed_fields`/`is_saved` methods construct one
/// internally.
#[derive(Debug)]
pub struct ChangeTracker<'a, B: StoreBackend> {
    backend: &'a B,
    collection: &'a str,
}

impl<'a, B: StoreBackend> ChangeTracker<'a, B> {
    pub fn new(backend: &'a B, collection: &'a str) -> Self {
        Self { backend, collection }
    }

    /// Returns the fields whose in-memory value diverges from the stored one,
    /// each mapped to its in-memory value.
    ///
    /// A document without an identity has no prior state to diff against and
    /// yields an empty mapping; callers cannot distinguish that from a fully
    /// synced document through this method alone. A field counts as changed
    /// when the stored record is gone, the field is absent server-side, or the
    /// stored value differs.
    ///
    /// On a backing-store read failure the error is logged and an empty
    /// mapping is reported; callers must not take that as proof of
    /// persistence.
    pub async fn changed_fields(&self, id: Option<&ObjectId>, fields: &FieldMap) -> Document {
        let Some(id) = id else {
            return Document::new();
        };

        let mut changed = Document::new();
        for (name, value) in fields.iter() {
            let stored = match self
                .backend
                .find_one(self.collection, doc! { "_id": *id }, Some(doc! { name.as_str(): 1 }))
                .await
            {
                Ok(stored) => stored,
                Err(err) => {
                    error!("Error querying collection '{}': {err}", self.collection);
                    return Document::new();
                }
            };

            let diverged = match stored.as_ref().and_then(|record| record.get(name)) {
                Some(stored_value) => !values_equal(stored_value, value),
                // Record or field missing server-side.
                None => true,
            };

            if diverged {
                changed.insert(name.clone(), value.clone());
            }
        }

        changed
    }

    /// Returns `true` when nothing remains to be written.
    ///
    /// A document without an identity is saved only in the degenerate case of
    /// an empty field map; that case conflates "never saved, with nothing to
    /// write" and "fully persisted". With an identity, saved means
    /// [`changed_fields`](Self::changed_fields) is empty.
    pub async fn is_saved(&self, id: Option<&ObjectId>, fields: &FieldMap) -> bool {
        if id.is_none() {
            return fields.is_empty();
        }
        self.changed_fields(id, fields).await.is_empty()
    }
}

/// Value equality with integer and floating-point widths normalized.
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    fn as_number(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(n) => Some(*n as f64),
            Bson::Int64(n) => Some(*n as f64),
            Bson::Double(n) => Some(*n),
            _ => None,
        }
    }

    match (left, right) {
        (Bson::Array(left), Bson::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(l, r)| values_equal(l, r))
        }
        (Bson::Document(left), Bson::Document(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(k, l)| right.get(k).is_some_and(|r| values_equal(l, r)))
        }
        (left, right) => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l == r,
            _ => left == right,
        },
    }
}
