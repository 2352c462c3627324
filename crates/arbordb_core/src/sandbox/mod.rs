//! Mapping-function sandbox.
//!
//! An index's `func` is a unary function from a document to either nothing
//! or a `[key, value]` pair. The [`Sandbox`] trait is the only seam the index
//! engine sees; [`JsSandbox`] runs the function as JavaScript on the embedded
//! `boa_engine` runtime.

mod js;

use arbordb_codec::Document;
use thiserror::Error;

pub use js::JsSandbox;

/// A mapping function failed to parse, run, or return a valid shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    /// Creates an evaluation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying script error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A `[key, value]` pair produced by a mapping function.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Emitted key; becomes the last segment(s) of the derived entry id.
    pub key: String,
    /// Emitted body. Its `id` is overwritten by the index engine.
    pub value: Document,
}

/// Evaluates mapping functions against single documents.
///
/// # Invariants
///
/// - Each call runs in a fresh context; nothing survives between calls
/// - The function sees exactly one document and nothing of the host
/// - `Ok(None)` means the document contributes nothing to the index
pub trait Sandbox: Send + Sync {
    /// Applies the function in `source` to `document`.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] on syntax errors, runtime errors,
    /// exceeded limits, or a return value that is neither null/undefined nor
    /// a two-element array.
    fn evaluate(&self, document: &Document, source: &str)
        -> Result<Option<Emission>, EvaluationError>;
}
