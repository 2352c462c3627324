//! # ArborDB Codec
//!
//! Document model and JSON codec for ArborDB.
//!
//! This crate provides:
//! - [`Value`], a tagged union over every JSON-representable value
//! - [`Document`], a JSON object with a reserved `id` field
//! - [`path`] helpers for slash-separated document identifiers
//!
//! Documents are persisted as plain JSON. Keys are kept in sorted order so
//! identical documents always encode to identical bytes.
//!
//! ## Usage
//!
//! ```
//! use arbordb_codec::{Document, Value};
//!
//! let mut doc = Document::new("movies/matrix").with("name", "Matrix");
//! doc.patch(Document::new("movies/matrix").with("year", 1999));
//!
//! assert_eq!(doc.id().unwrap(), "movies/matrix");
//! assert_eq!(doc.get("year"), Some(&Value::Integer(1999)));
//!
//! let bytes = doc.to_json_vec().unwrap();
//! assert_eq!(Document::from_json_slice(&bytes).unwrap(), doc);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
pub mod path;
mod value;

pub use document::{Document, ID_FIELD};
pub use error::{CodecError, CodecResult};
pub use value::Value;
