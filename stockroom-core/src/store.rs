//! Main document store handle.
//!
//! A [`DocumentStore`] owns one backend instance. Nothing here is global: every store
//! is constructed explicitly, handed to whoever needs it, and shut down by its owner.
//!
//! ```ignore
//! use stockroom_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let providers = store.typed_collection::<Provider>();
//! // ...
//! store.shutdown().await?;
//! ```

use crate::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreResult,
};

/// A document store bound to a specific backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend this store wraps.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a typed collection for the specified document type.
    ///
    /// The collection name is determined by the document type's `collection_name()` method.
    pub fn typed_collection<'a, D: Document>(&'a self) -> TypedCollection<'a, B, D> {
        TypedCollection::new(D::collection_name().to_string(), &self.backend)
    }

    /// Creates a new collection with the given name. Existing collections are kept.
    pub async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.backend
            .create_collection(name)
            .await
    }

    /// Drops a collection with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection does not exist.
    pub async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Makes every write so far durable.
    pub async fn flush(&self) -> DocumentStoreResult<()> {
        self.backend.flush().await
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}
