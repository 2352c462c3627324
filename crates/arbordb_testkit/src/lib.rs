//! # ArborDB Testkit
//!
//! Test utilities for ArborDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - A harness replaying operation sequences against both storage backends
//!
//! ## Usage
//!
//! ```rust
//! use arbordb_codec::Document;
//! use arbordb_testkit::prelude::*;
//!
//! with_each_backend(|db| {
//!     db.set(Document::new("movies/matrix").with("name", "Matrix")).unwrap();
//!     assert_eq!(db.list("movies").unwrap(), vec!["matrix"]);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod equivalence;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::equivalence::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use equivalence::*;
pub use fixtures::*;
pub use generators::*;
