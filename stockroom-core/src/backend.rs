//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between the typed collections and a concrete
//! storage strategy. Documents cross it as `(Uuid, Bson)` pairs; backends never see
//! the record types.
//!
//! # Examples
//!
//! ```ignore
//! use stockroom_core::backend::StoreBackend;
//! use bson::{Uuid, Bson, doc};
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = Uuid::new();
//! let doc = Bson::Document(doc! { "name": "Acme", "phone": "555-0100" });
//! backend.insert_unique(id, doc, "name", "providers").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, Uuid};
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    query::{Expr, Query},
};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Each operation is atomic with respect to
/// the others; no operation spans more than one call, so there are no transactions.
///
/// # Ordering
///
/// Scans visit documents in the order they were first inserted. Updates keep a
/// document's position.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts new documents into a collection.
    ///
    /// The collection is created if it does not exist.
    ///
    /// # Errors
    ///
    /// [`DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
    /// if an ID is already present. Nothing is inserted in that case.
    async fn insert_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Inserts a document unless a live document already holds the same value in `field`.
    ///
    /// The check and the insert happen under one write, so two concurrent calls for the
    /// same value cannot both succeed.
    ///
    /// # Errors
    ///
    /// [`UniqueViolation`](crate::error::DocumentStoreError::UniqueViolation) when the
    /// value is taken, [`InvalidDocument`](crate::error::DocumentStoreError::InvalidDocument)
    /// when the document lacks `field`.
    async fn insert_unique(
        &self,
        id: Uuid,
        document: Bson,
        field: &str,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Replaces existing documents entirely.
    ///
    /// # Errors
    ///
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) if any ID
    /// is absent. Nothing is written in that case.
    async fn update_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Replaces a document unless another live document holds the same value in `field`.
    ///
    /// The document being replaced does not count against itself.
    ///
    /// # Errors
    ///
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) if the ID
    /// is absent, [`UniqueViolation`](crate::error::DocumentStoreError::UniqueViolation)
    /// when the value belongs to another document.
    async fn update_unique(
        &self,
        id: Uuid,
        document: Bson,
        field: &str,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Replaces a document only if its stored version matches `condition`.
    ///
    /// Returns `false` and writes nothing when the condition does not hold. The check
    /// and the replace happen under one write.
    ///
    /// # Errors
    ///
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) if the ID
    /// is absent.
    async fn update_if(
        &self,
        id: Uuid,
        document: Bson,
        condition: &Expr,
        collection: &str,
    ) -> DocumentStoreResult<bool>;

    /// Deletes documents by ID.
    ///
    /// # Errors
    ///
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) if any ID
    /// is absent. Nothing is removed in that case.
    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()>;

    /// Retrieves documents by ID. Missing IDs are omitted from the result.
    async fn get_documents(
        &self,
        ids: Vec<Uuid>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Scans a collection and returns the documents accepted by the query filter,
    /// stopping at the query limit. A missing collection yields no documents.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Creates an empty collection. Creating an existing collection is a no-op.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Drops a collection and all its documents.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Makes every write so far durable. Backends without durable storage do nothing.
    async fn flush(&self) -> DocumentStoreResult<()> {
        Ok(())
    }

    /// Flushes and releases backend resources.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        self.flush().await
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        (*self)
            .insert_documents(documents, collection)
            .await
    }

    async fn insert_unique(
        &self,
        id: Uuid,
        document: Bson,
        field: &str,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        (*self)
            .insert_unique(id, document, field, collection)
            .await
    }

    async fn update_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        (*self)
            .update_documents(documents, collection)
            .await
    }

    async fn update_unique(
        &self,
        id: Uuid,
        document: Bson,
        field: &str,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        (*self)
            .update_unique(id, document, field, collection)
            .await
    }

    async fn update_if(
        &self,
        id: Uuid,
        document: Bson,
        condition: &Expr,
        collection: &str,
    ) -> DocumentStoreResult<bool> {
        (*self)
            .update_if(id, document, condition, collection)
            .await
    }

    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()> {
        (*self)
            .delete_documents(ids, collection)
            .await
    }

    async fn get_documents(
        &self,
        ids: Vec<Uuid>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        (*self)
            .get_documents(ids, collection)
            .await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        (*self)
            .query_documents(query, collection)
            .await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).drop_collection(name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        (*self).list_collections().await
    }

    async fn flush(&self) -> DocumentStoreResult<()> {
        (*self).flush().await
    }
}

/// Factory trait for opening backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
