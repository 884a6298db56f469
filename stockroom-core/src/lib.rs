//! Core of the stockroom document layer.
//!
//! - **Document traits** ([`document`]) - Records and their BSON/JSON conversion
//! - **Store backend abstraction** ([`backend`]) - The trait every storage strategy implements
//! - **Query and filtering API** ([`query`]) - Predicate scans with an optional result cap
//! - **Collections interface** ([`collection`]) - Typed access to one collection
//! - **Document store** ([`store`]) - The explicitly constructed store handle
//! - **Error handling** ([`error`]) - Store error and result types

#[allow(unused_extern_crates)]
extern crate self as stockroom_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
