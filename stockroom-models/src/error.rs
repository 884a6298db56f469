//! Failures surfaced by the entity models.
//!
//! Validation, duplicate, not-found, auth and unsupported-type failures are caused by
//! the caller's input. Store and internal failures are not; an adapter maps them to a
//! generic server error.

use stockroom_core::error::DocumentStoreError;
use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Another live record already holds the unique key.
    #[error("{kind} already exists")]
    Duplicate {
        kind: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },
    /// Credentials or a refresh token were rejected.
    #[error("{0}")]
    Auth(String),
    #[error("unsupported type `{ty}` for field {field}")]
    UnsupportedType { field: String, ty: String },
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModelError {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ModelError::Store(_) | ModelError::Internal(_))
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
