//! # ArborDB Storage
//!
//! Document storage backends for ArborDB.
//!
//! This crate provides the lowest-level storage abstraction for ArborDB: a
//! hierarchical key space of JSON documents addressed by slash-separated
//! identifiers. Backends know nothing about indexes; they store, list and
//! delete documents, and keep the folder tree free of empty branches.
//!
//! ## Design Principles
//!
//! - Every write replaces a whole document atomically
//! - Folders are implied by the documents beneath them
//! - Backends perform no locking around compound operations
//! - Must be `Send + Sync` so a single instance can be shared
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage as a directory tree of `.json` files
//!
//! Both backends behave identically for every operation sequence.
//!
//! ## Example
//!
//! ```rust
//! use arbordb_codec::Document;
//! use arbordb_storage::{DocumentStore, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.set(Document::new("movies/matrix").with("name", "Matrix")).unwrap();
//! let doc = backend.get("movies/matrix").unwrap();
//! assert_eq!(doc.id().unwrap(), "movies/matrix");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{
    document_id, has_reserved_folder, is_folder_entry, resolve_id, DocumentStore, FOLDER_SUFFIX,
};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
