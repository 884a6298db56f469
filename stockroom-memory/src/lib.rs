//! Local document storage backend for stockroom.
//!
//! This crate provides the authoritative store of the stockroom layer: a thread-safe,
//! insertion-ordered, in-memory implementation of `StoreBackend` that can optionally
//! persist itself to a snapshot file.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Insertion order** - Scans visit documents in the order they were created
//! - **Atomic insert-if-absent** - Uniqueness checks happen under the same write as the insert
//! - **Snapshots** - Optional load-on-open, flush-on-close persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use stockroom_core::{backend::StoreBackendBuilder, store::DocumentStore};
//! use stockroom_memory::InMemoryStore;
//!
//! let backend = InMemoryStore::builder()
//!     .with_snapshot_path("stockroom.bson")
//!     .build()
//!     .await?;
//! let store = DocumentStore::new(backend);
//! // ...
//! store.shutdown().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as stockroom_memory;

pub mod config;
mod evaluator;
mod snapshot;
pub mod store;

pub use config::MemoryStoreConfig;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
