//! Main stockroom crate: a validated document-store layer for an inventory and sales
//! backend.
//!
//! This crate re-exports the sub-crates under one roof:
//!
//! - [`store`], [`document`], [`collection`], [`backend`], [`query`], [`error`] - the
//!   document store abstraction
//! - [`memory`] - the local, optionally snapshotted backend
//! - [`models`] - validation rules, entity repositories, auth and [`Inventory`]
//!
//! # Features
//!
//! - **Validated writes** - Every payload passes its field rules before the store sees it
//! - **Unique keys** - Insert-if-absent keyed by each kind's unique field
//! - **Capped listing** - `get_all` never returns more than 100 records
//! - **Local persistence** - Load a snapshot on open, write it back on close
//!
//! # Quick Start
//!
//! ```ignore
//! use serde_json::json;
//! use stockroom::{Inventory, memory::InMemoryStore, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> ModelResult<()> {
//!     let backend = InMemoryStore::builder()
//!         .with_snapshot_path("stockroom.bson")
//!         .build()
//!         .await?;
//!     let inventory = Inventory::open(backend).await?;
//!
//!     let id = inventory
//!         .auth()
//!         .register(&json!({ "username": "alice", "email": "alice@shop.test", "password": "s3cret" }))
//!         .await?;
//!     let user = inventory
//!         .auth()
//!         .login(&json!({ "username": "alice", "password": "s3cret" }))
//!         .await?;
//!     let token = inventory.auth().issue_and_store_refresh_token(id).await?;
//!
//!     println!("{} logged in, refresh token {token}", user.username);
//!
//!     inventory.close().await
//! }
//! ```

pub mod prelude;

pub use stockroom_core::{backend, collection, document, error, query, store};
pub use stockroom_models::Inventory;

// Re-export BSON types for convenience
pub use bson;

/// Local storage backend.
pub mod memory {
    pub use stockroom_memory::{InMemoryStore, InMemoryStoreBuilder, MemoryStoreConfig};
}

/// Validation, entity kinds and repositories.
pub mod models {
    pub use stockroom_models::{auth, entities, inventory, repository, validate};
    pub use stockroom_models::{ModelError, ModelResult};
}
