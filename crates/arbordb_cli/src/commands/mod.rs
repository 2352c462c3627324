//! CLI command implementations.
//!
//! Every command returns the JSON value printed on stdout.

pub mod document;
pub mod folder;

use arbordb_core::CoreError;
use thiserror::Error;

/// Result of a command.
pub type CommandResult = Result<serde_json::Value, CommandError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A field argument is not of the form `key=value`.
    #[error("expected key=value, got {0:?}")]
    MalformedField(String),

    /// A field argument tried to set the identifier.
    #[error("the id comes from the identifier argument, not from a field")]
    ReservedField,

    /// `--body` is not a JSON object.
    #[error("body must be a JSON object: {0}")]
    InvalidBody(String),

    /// The database rejected the operation.
    #[error(transparent)]
    Database(#[from] CoreError),

    /// The output could not be encoded.
    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}
