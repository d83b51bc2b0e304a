//! The explicit store handle that owns a backend.
//!
//! A [`DocumentStore`] is constructed once at process start and passed by
//! reference to everything that needs database access; there is no ambient
//! global connection. Collection bindings borrow the store, so the store must
//! outlive every binding and document derived from it, in practice for the
//! life of the process.

use crate::backend::StoreBackend;
use crate::collection::Collection;
use crate::schema::Schema;

/// A document store bound to a specific backend implementation.
///
/// # Example
///
/// ```ignore
/// use docbind::store::DocumentStore;
///
/// let store = DocumentStore::new(backend);
/// let users = store.collection("users");
/// ```
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrows the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a schema-less binding for the named collection.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend, None)
    }

    /// Gets a binding for the named collection with a schema attached.
    ///
    /// The schema is enforced on every save through this binding.
    pub fn collection_with_schema<'a>(&'a self, name: &str, schema: Schema) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend, Some(schema))
    }
}
