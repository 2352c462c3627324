//! Error types for storage operations.

use arbordb_codec::CodecError;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A create-only write found an existing document.
    #[error("document already exists: {id}")]
    DocumentAlreadyExists {
        /// The identifier that was already taken.
        id: String,
    },

    /// No document is stored at the requested identifier.
    #[error("document does not exist: {id}")]
    DocumentDoesNotExist {
        /// The identifier that was looked up.
        id: String,
    },

    /// The document to write has no fields.
    #[error("empty document")]
    EmptyDocument,

    /// The document to write has a missing or empty identifier.
    #[error("invalid id")]
    InvalidId,

    /// A stored document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(CodecError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates a document-does-not-exist error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::DocumentDoesNotExist { id: id.into() }
    }

    /// Returns true for [`StorageError::DocumentDoesNotExist`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentDoesNotExist { .. })
    }
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::EmptyDocument => Self::EmptyDocument,
            CodecError::InvalidId => Self::InvalidId,
            other => Self::Codec(other),
        }
    }
}
