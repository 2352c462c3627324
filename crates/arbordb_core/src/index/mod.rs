//! Folder-local secondary indexes.
//!
//! An index is defined by a document at `<folder>/_indexes/<name>` whose
//! `func` field holds a mapping function. Its derived entries live at
//! `<folder>/_indexes/<name>/<key>` and are recomputed from scratch by the
//! [`IndexEngine`] after every mutation in `<folder>`.

mod definition;
mod engine;

pub use definition::{
    indexes_folder, is_index_definition, rebuild_scope, IndexDefinition, FUNC_FIELD,
    INDEXES_FOLDER,
};
pub use engine::{IndexEngine, RebuildReport};
