//! Convenient re-exports of commonly used types from stockroom.
//!
//! ```ignore
//! use stockroom::prelude::*;
//! ```

pub use stockroom_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::TypedCollection,
    document::{Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor},
    store::DocumentStore,
};
pub use stockroom_models::{
    AuthService, Entity, Inventory, ModelError, ModelResult, Repository, ValidationError,
    entities::{
        LineItem, Product, ProductVariant, Provider, PublicUser, Role, Sell, SellStatus, Seller,
        User, VariantLine,
    },
};
