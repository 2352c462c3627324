//! Property-based test generators using proptest.
//!
//! Identifiers are drawn from a tiny alphabet so generated sequences keep
//! hitting the same documents and folders, including a name that is both a
//! document and a folder and a name that collides with a document file.

use arbordb_codec::{path, Document, Value};
use proptest::prelude::*;

/// Mapping function installed by [`Operation::DefineIndex`].
///
/// Indexes every document with a `v` field by that field's value.
pub const GENERATED_INDEX_FUNC: &str =
    "(doc) => doc.v === undefined ? null : [String(doc.v), {from: doc.id}]";

/// Strategy for a single identifier segment.
///
/// `b.json` is a legal document name but a reserved folder name.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "b.json"]).prop_map(str::to_string)
}

/// Strategy for document identifiers of one to three segments.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..=3).prop_map(|segments| segments.join("/"))
}

/// Strategy for folder identifiers, the root included.
pub fn folder_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 0..=2).prop_map(|segments| segments.join("/"))
}

/// Strategy for field values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (0i64..4).prop_map(Value::Integer),
        "[a-z]{0,6}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..3).prop_map(Value::Map),
        ]
    })
}

/// Strategy for document bodies without an `id`.
pub fn body_strategy() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(
        prop::sample::select(vec!["v", "w", "name"]).prop_map(str::to_string),
        value_strategy(),
        0..3,
    )
    .prop_map(Document::from)
}

/// Strategy for storable documents.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    (id_strategy(), body_strategy()).prop_map(|(id, mut body)| {
        body.set_id(id);
        body
    })
}

/// A mutation replayed against a store or a database.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Replace a document.
    Set {
        /// The document to write.
        document: Document,
    },
    /// Merge into a document.
    Patch {
        /// The fields to merge, id included.
        document: Document,
    },
    /// Delete a document.
    Delete {
        /// Identifier to delete.
        id: String,
    },
    /// Delete a folder.
    DeleteFolder {
        /// Folder to delete.
        folder: String,
    },
    /// Define an index in a folder using [`GENERATED_INDEX_FUNC`].
    DefineIndex {
        /// Folder the index covers.
        folder: String,
    },
}

impl Operation {
    /// The index definition document written by [`Operation::DefineIndex`].
    pub fn index_definition(folder: &str) -> Document {
        Document::new(path::join(folder, "_indexes/by_v")).with("func", GENERATED_INDEX_FUNC)
    }
}

/// Strategy for operations valid at the storage level.
pub fn store_operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => document_strategy().prop_map(|document| Operation::Set { document }),
        2 => document_strategy().prop_map(|document| Operation::Patch { document }),
        2 => id_strategy().prop_map(|id| Operation::Delete { id }),
        1 => folder_strategy().prop_map(|folder| Operation::DeleteFolder { folder }),
    ]
}

/// Strategy for operations including index definitions.
pub fn database_operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        8 => store_operation_strategy(),
        1 => folder_strategy().prop_map(|folder| Operation::DefineIndex { folder }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    operations: impl Strategy<Value = Operation>,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operations, min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
