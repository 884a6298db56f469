//! Entry point owning the store behind every repository.

use stockroom_core::{backend::StoreBackend, document::Document, store::DocumentStore};
use tracing::info;

use crate::{
    auth::AuthService,
    entities::{Product, ProductVariant, Provider, Sell, Seller, User},
    error::ModelResult,
    repository::Repository,
};

/// An inventory backed by one store.
///
/// ```ignore
/// let inventory = Inventory::open(InMemoryStore::builder().build().await?).await?;
/// let id = inventory.providers().create(&payload).await?;
/// inventory.close().await?;
/// ```
#[derive(Debug)]
pub struct Inventory<B: StoreBackend> {
    store: DocumentStore<B>,
}

impl<B: StoreBackend> Inventory<B> {
    /// Wraps `backend` and makes sure every collection exists.
    pub async fn open(backend: B) -> ModelResult<Self> {
        let store = DocumentStore::new(backend);

        for name in Self::collection_names() {
            store.create_collection(name).await?;
        }

        info!("inventory opened");
        Ok(Self { store })
    }

    pub fn collection_names() -> [&'static str; 6] {
        [
            User::collection_name(),
            Product::collection_name(),
            ProductVariant::collection_name(),
            Provider::collection_name(),
            Seller::collection_name(),
            Sell::collection_name(),
        ]
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    pub fn auth(&self) -> AuthService<'_, B> {
        AuthService::new(&self.store)
    }

    pub fn users(&self) -> Repository<'_, B, User> {
        Repository::new(&self.store)
    }

    pub fn products(&self) -> Repository<'_, B, Product> {
        Repository::new(&self.store)
    }

    pub fn product_variants(&self) -> Repository<'_, B, ProductVariant> {
        Repository::new(&self.store)
    }

    pub fn providers(&self) -> Repository<'_, B, Provider> {
        Repository::new(&self.store)
    }

    pub fn sellers(&self) -> Repository<'_, B, Seller> {
        Repository::new(&self.store)
    }

    pub fn sells(&self) -> Repository<'_, B, Sell> {
        Repository::new(&self.store)
    }

    /// Flushes and shuts the store down.
    pub async fn close(self) -> ModelResult<()> {
        self.store.shutdown().await?;

        info!("inventory closed");
        Ok(())
    }
}
