//! Error types for ArborDB core.

use crate::sandbox::EvaluationError;
use arbordb_codec::CodecError;
use arbordb_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The closed set of error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A create-only write found an existing document.
    DocumentAlreadyExists,
    /// Get or delete on an identifier with no document.
    DocumentDoesNotExist,
    /// An id was requested from a document with no fields.
    EmptyDocument,
    /// Empty, unresolvable or escaping identifier on write.
    InvalidId,
    /// A mapping function failed to parse, run, or return a valid shape.
    Evaluation,
    /// An index definition document lacks `id` or `func`.
    InvalidIndexDefinition,
    /// A stored document could not be decoded.
    Codec,
    /// Filesystem failure, passed through verbatim.
    Io,
}

/// Errors that can occur in ArborDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Document codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An index mapping function failed for one sibling document.
    #[error("index {index_id} failed on {document_id}: {source}")]
    Evaluation {
        /// The index definition whose function failed.
        index_id: String,
        /// The sibling document being mapped.
        document_id: String,
        /// The underlying script failure.
        source: EvaluationError,
    },

    /// An index definition document is malformed.
    #[error("invalid index definition {id}: {message}")]
    InvalidIndexDefinition {
        /// Identifier of the offending definition.
        id: String,
        /// What is wrong with it.
        message: String,
    },
}

impl CoreError {
    /// Creates an evaluation error for `index_id` applied to `document_id`.
    pub fn evaluation(
        index_id: impl Into<String>,
        document_id: impl Into<String>,
        source: EvaluationError,
    ) -> Self {
        Self::Evaluation {
            index_id: index_id.into(),
            document_id: document_id.into(),
            source,
        }
    }

    /// Creates an invalid index definition error.
    pub fn invalid_index_definition(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIndexDefinition {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid id error.
    pub fn invalid_id() -> Self {
        Self::Storage(StorageError::InvalidId)
    }

    /// Classifies the error into one of the closed error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(err) => match err {
                StorageError::DocumentAlreadyExists { .. } => ErrorKind::DocumentAlreadyExists,
                StorageError::DocumentDoesNotExist { .. } => ErrorKind::DocumentDoesNotExist,
                StorageError::EmptyDocument => ErrorKind::EmptyDocument,
                StorageError::InvalidId => ErrorKind::InvalidId,
                StorageError::Codec(_) => ErrorKind::Codec,
                StorageError::Io(_) => ErrorKind::Io,
            },
            Self::Codec(CodecError::EmptyDocument) => ErrorKind::EmptyDocument,
            Self::Codec(CodecError::InvalidId) => ErrorKind::InvalidId,
            Self::Codec(CodecError::Json(_)) => ErrorKind::Codec,
            Self::Evaluation { .. } => ErrorKind::Evaluation,
            Self::InvalidIndexDefinition { .. } => ErrorKind::InvalidIndexDefinition,
        }
    }

    /// Returns true if the error means the document does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::DocumentDoesNotExist
    }
}
