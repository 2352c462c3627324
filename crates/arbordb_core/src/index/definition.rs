//! Index definitions and their place in the namespace.

use crate::error::{CoreError, CoreResult};
use arbordb_codec::{path, Document, Value, ID_FIELD};

/// Folder segment under which a folder's index definitions live.
pub const INDEXES_FOLDER: &str = "_indexes";

/// Field of an index definition holding the mapping function source.
pub const FUNC_FIELD: &str = "func";

/// A parsed index definition.
///
/// Stored as an ordinary document at `<folder>/_indexes/<name>`. Its derived
/// entries live beneath it, at `<id>/<emitted key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Identifier of the definition document, also the derived-entry folder.
    pub id: String,
    /// Source text of the mapping function.
    pub func: String,
}

impl IndexDefinition {
    /// Creates a definition.
    pub fn new(id: impl Into<String>, func: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            func: func.into(),
        }
    }

    /// Parses a stored definition document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIndexDefinition` if `id` or `func` is missing, not a
    /// string, or empty.
    pub fn from_document(document: &Document) -> CoreResult<Self> {
        let id = match document.get(ID_FIELD) {
            Some(Value::Text(id)) if !path::is_root(id) => path::normalize(id),
            _ => {
                return Err(CoreError::invalid_index_definition(
                    "<unknown>",
                    "missing or empty `id`",
                ));
            }
        };

        match document.get(FUNC_FIELD) {
            Some(Value::Text(func)) if !func.trim().is_empty() => Ok(Self {
                id,
                func: func.clone(),
            }),
            Some(other) => Err(CoreError::invalid_index_definition(
                id,
                format!("`func` must be a string, got {}", other.type_name()),
            )),
            None => Err(CoreError::invalid_index_definition(id, "missing `func`")),
        }
    }

    /// Renders the definition as a storable document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        Document::new(self.id.clone()).with(FUNC_FIELD, self.func.clone())
    }

    /// Identifier of the derived entry for an emitted key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the key is blank after normalization or would
    /// leave the index folder.
    pub fn entry_id(&self, key: &str) -> CoreResult<String> {
        if path::is_root(key) || path::has_parent_traversal(key) {
            return Err(CoreError::invalid_id());
        }
        Ok(path::join(&self.id, key))
    }
}

/// The folder holding `folder`'s index definitions.
pub fn indexes_folder(folder: &str) -> String {
    path::join(folder, INDEXES_FOLDER)
}

/// Returns true if `id` names an index definition document.
pub fn is_index_definition(id: &str) -> bool {
    path::name(&path::folder(id)) == INDEXES_FOLDER
}

/// The folder whose indexes must be rebuilt after `id` changes.
///
/// Normally the document's own folder. A change to an index definition
/// rebuilds the folder the definition indexes.
pub fn rebuild_scope(id: &str) -> String {
    let folder = path::folder(id);
    if path::name(&folder) == INDEXES_FOLDER {
        path::folder(&folder)
    } else {
        folder
    }
}
