//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while inspecting, encoding or decoding documents.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The document has no fields at all.
    #[error("empty document")]
    EmptyDocument,

    /// The document's `id` field is missing, not a string, or empty.
    #[error("invalid id")]
    InvalidId,

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
