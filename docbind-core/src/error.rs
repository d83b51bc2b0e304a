//! Error types and result types for document binding operations.
//!
//! This module provides the error taxonomy for the whole crate. Use
//! [`DocBindResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with bound documents.
///
/// This enum covers connection bootstrap, document lifecycle, schema validation,
/// result list helpers, and backend-specific errors.
#[derive(Error, Debug)]
pub enum DocBindError {
    /// Connection bootstrap failed after exhausting retries, or required
    /// configuration was missing.
    #[error("Connection error: {0}")]
    Connection(String),
    /// An operation was attempted on a document with no bound collection.
    /// This is a programmer error and is always raised.
    #[error("Document is not bound to a collection")]
    CollectionMissing,
    /// The document violates its schema. Raised before any store mutation.
    #[error("Validation error: {0}")]
    Validation(String),
    /// A field is present on the document but not declared in the schema.
    #[error("Field '{0}' is not in the schema")]
    FieldNotInSchema(String),
    /// The addressed record vanished server-side between operations.
    /// The first argument is the document id, the second is the collection name.
    #[error("Document {0} not found in collection {1}")]
    NotFound(String, String),
    /// An operation that needs a store-assigned identity was attempted on a
    /// document that was never saved.
    #[error("Cannot {0} an unsaved document")]
    UnsavedDocument(&'static str),
    /// A malformed identity string was supplied on direct construction.
    /// Note that `get_by_id` deliberately returns `None` instead of this error.
    #[error("Invalid document id: {0}")]
    InvalidId(String),
    /// An invalid index specification was supplied (for example, no keys).
    #[error("Invalid index specification: {0}")]
    InvalidIndex(String),
    /// A result list helper that requires elements was called on an empty list.
    #[error("Cannot {0} an empty result list")]
    EmptyResult(&'static str),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document binding operations.
pub type DocBindResult<T> = Result<T, DocBindError>;

impl From<BsonError> for DocBindError {
    fn from(err: BsonError) -> Self {
        DocBindError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocBindError {
    fn from(err: SerdeJsonError) -> Self {
        DocBindError::Serialization(err.to_string())
    }
}
