//! Validated entity models for stockroom.
//!
//! Every entity kind (users, products, product variants, providers, sellers and
//! sells) is reached through a [`Repository`] that validates untrusted JSON payloads
//! with the rules in [`validate`] before writing to a document store. [`Inventory`]
//! owns the store and hands the repositories out; [`AuthService`] adds login and
//! refresh tokens on top of the user repository.
//!
//! # Quick Start
//!
//! ```ignore
//! use serde_json::json;
//! use stockroom_memory::InMemoryStore;
//! use stockroom_models::Inventory;
//!
//! let inventory = Inventory::open(InMemoryStore::new()).await?;
//! let id = inventory
//!     .providers()
//!     .create(&json!({
//!         "name": "Acme",
//!         "email": "sales@acme.test",
//!         "phone": "555-0100",
//!         "address": "1 Main St",
//!     }))
//!     .await?;
//! let found = inventory.providers().get_by_field("name", &json!("Acme"), "string").await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as stockroom_models;

pub mod auth;
pub mod entities;
pub mod error;
pub mod inventory;
pub mod repository;
pub mod validate;

pub use auth::AuthService;
pub use error::{ModelError, ModelResult};
pub use inventory::Inventory;
pub use repository::{Entity, MAX_RESULTS, Repository};
pub use validate::{ValidationError, ValidationResult};
