//! Typed collection access.
//!
//! A [`TypedCollection`] binds a record type to its collection on a backend and does
//! the BSON conversion in both directions. It never hands out live references into
//! the store: reads return owned copies and every change is an explicit write-back.
//!
//! ```ignore
//! let providers = store.typed_collection::<Provider>();
//! let mut provider = providers.get_one(id).await?.ok_or(NotFound)?;
//! provider.phone = "555-0199".to_string();
//! providers.update(vec![provider]).await?;
//! ```

use bson::{Bson, Uuid};
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    query::{Expr, Query},
};

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts new documents.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails or an ID is already present.
    pub async fn insert(&self, documents: Vec<D>) -> DocumentStoreResult<()> {
        self.backend
            .insert_documents(Self::encode(documents)?, self.name())
            .await
    }

    /// Inserts a document unless another live document holds the same value in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`UniqueViolation`](crate::error::DocumentStoreError::UniqueViolation)
    /// when the value is taken.
    pub async fn insert_unique(&self, document: D, field: &str) -> DocumentStoreResult<()> {
        let id = *document.id();

        self.backend
            .insert_unique(id, document.to_bson()?, field, self.name())
            .await
    }

    /// Replaces existing documents with new values.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails or a document is not in the collection.
    pub async fn update(&self, documents: Vec<D>) -> DocumentStoreResult<()> {
        self.backend
            .update_documents(Self::encode(documents)?, self.name())
            .await
    }

    /// Replaces a document unless another live document holds the same value in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`UniqueViolation`](crate::error::DocumentStoreError::UniqueViolation)
    /// when the value belongs to another document.
    pub async fn update_unique(&self, document: D, field: &str) -> DocumentStoreResult<()> {
        let id = *document.id();

        self.backend
            .update_unique(id, document.to_bson()?, field, self.name())
            .await
    }

    /// Replaces a document if its stored version still matches `condition`.
    ///
    /// Returns whether the write happened.
    pub async fn update_if(&self, document: D, condition: &Expr) -> DocumentStoreResult<bool> {
        let id = *document.id();

        self.backend
            .update_if(id, document.to_bson()?, condition, self.name())
            .await
    }

    /// Deletes documents by ID.
    ///
    /// # Errors
    ///
    /// Fails if a document is not in the collection.
    pub async fn delete<U>(&self, ids: Vec<U>) -> DocumentStoreResult<()>
    where
        U: Into<Uuid> + Send + Sync + 'static,
    {
        self.backend
            .delete_documents(
                ids.into_iter()
                    .map(Into::into)
                    .collect(),
                self.name(),
            )
            .await
    }

    /// Retrieves documents by ID. Missing IDs are omitted from the result.
    pub async fn get<U>(&self, ids: Vec<U>) -> DocumentStoreResult<Vec<D>>
    where
        U: Into<Uuid> + Send + Sync + 'static,
    {
        Self::decode(
            self.backend
                .get_documents(
                    ids.into_iter()
                        .map(Into::into)
                        .collect(),
                    self.name(),
                )
                .await?,
        )
    }

    /// Retrieves a single document by ID, or `None` if it is absent.
    pub async fn get_one(&self, id: Uuid) -> DocumentStoreResult<Option<D>> {
        Ok(self
            .get(vec![id])
            .await?
            .into_iter()
            .next())
    }

    /// Returns every document matching the query, in store iteration order.
    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        Self::decode(
            self.backend
                .query_documents(query, self.name())
                .await?,
        )
    }

    /// Returns the first document matching the filter, or `None`.
    pub async fn find_one(&self, filter: Expr) -> DocumentStoreResult<Option<D>> {
        Ok(self
            .query(Query::builder().filter(filter).limit(1).build())
            .await?
            .into_iter()
            .next())
    }

    fn encode(documents: Vec<D>) -> DocumentStoreResult<Vec<(Uuid, Bson)>> {
        documents
            .into_iter()
            .map(|d| {
                d.to_bson()
                    .map(move |b| (*d.id(), b))
            })
            .collect()
    }

    fn decode(documents: Vec<Bson>) -> DocumentStoreResult<Vec<D>> {
        documents
            .into_iter()
            .map(D::from_bson)
            .collect()
    }
}
