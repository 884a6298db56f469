//! Error types and result types for document store operations.
//!
//! Every backend operation returns a [`DocumentStoreResult<T>`]. Callers higher up
//! (the entity repositories) translate the lifecycle variants into domain failures.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting records to and from BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error while opening the store or loading its snapshot.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// An insert-if-absent found a live document holding the same value in the keyed field.
    /// Arguments are the field name, the conflicting value and the collection name.
    #[error("Field {0} with value {1} already exists in collection {2}")]
    UniqueViolation(String, String, String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The document has an invalid structure (for example, it is not a BSON document).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DocumentStoreError {
    fn from(err: std::io::Error) -> Self {
        DocumentStoreError::Backend(err.to_string())
    }
}
