//! # ArborDB Core
//!
//! Core database engine for ArborDB.
//!
//! This crate provides:
//! - [`Database`], the facade over a [`arbordb_storage::DocumentStore`]
//! - Folder-local secondary indexes rebuilt after every mutation
//! - A sandbox running index mapping functions as JavaScript
//! - Configuration and the error surface shared by every operation
//!
//! ## Indexes
//!
//! Writing a document to `movies/_indexes/by_name` with a `func` field
//! defines an index over the documents of `movies`:
//!
//! ```rust
//! use arbordb_codec::Document;
//! use arbordb_core::Database;
//!
//! let db = Database::open_in_memory().unwrap();
//! db.set(Document::new("movies/_indexes/by_name").with("func", "(doc) => [doc.name, {}]"))
//!     .unwrap();
//! db.set(Document::new("movies/matrix").with("name", "Matrix")).unwrap();
//! db.set(Document::new("movies/superman").with("name", "Superman")).unwrap();
//!
//! assert_eq!(
//!     db.list("movies/_indexes/by_name").unwrap(),
//!     vec!["Matrix", "Superman"]
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
pub mod index;
pub mod sandbox;

pub use config::{Config, SandboxLimits};
pub use database::{Database, Node};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use index::{IndexDefinition, IndexEngine, RebuildReport};
pub use sandbox::{Emission, EvaluationError, JsSandbox, Sandbox};

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
