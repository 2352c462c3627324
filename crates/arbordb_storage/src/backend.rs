//! Storage backend trait definition.

use crate::error::{StorageError, StorageResult};
use arbordb_codec::{path, Document};

/// Suffix that marks a subfolder in [`DocumentStore::list`] results.
pub const FOLDER_SUFFIX: char = '/';

/// Folder names a file backend would place on the same path as a document
/// file (`<name>.json`) or its temporary file. Every backend refuses them.
const RESERVED_FOLDER_SUFFIXES: [&str; 2] = [".json", ".json.tmp"];

/// A hierarchical document store.
///
/// Documents are addressed by slash-separated identifiers. Folders are never
/// stored explicitly: they exist while at least one document lives beneath
/// them.
///
/// # Invariants
///
/// - `set` stores the whole document at its own (normalized) id and rewrites
///   the document's `id` field to that form
/// - `list` returns immediate child names, sorted; names ending in `/` are
///   subfolders, the others are documents
/// - listing a folder that does not exist yields an empty vector
/// - after `delete`, no empty folder is left between the document and the
///   namespace root
/// - identifiers with a `..` segment are a programming error and panic
///
/// No locking is performed around compound operations such as `patch`;
/// callers that mutate concurrently must serialize themselves.
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait DocumentStore: Send + Sync {
    /// Loads the document stored at `id`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentDoesNotExist` if nothing is stored at `id`.
    fn get(&self, id: &str) -> StorageResult<Document>;

    /// Stores `document` at its own id, replacing any existing document.
    ///
    /// Returns the document as persisted.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDocument` or `InvalidId` if the document has no usable
    /// id, or an I/O error.
    fn set(&self, document: Document) -> StorageResult<Document>;

    /// Shallow-merges `document` over the one stored at its id.
    ///
    /// A missing document is treated as an empty one seeded with the id.
    /// Fields not mentioned in `document` are preserved.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentStore::set`], plus any read error other than
    /// `DocumentDoesNotExist`.
    fn patch(&self, document: Document) -> StorageResult<Document> {
        let id = document_id(&document)?;
        let mut merged = match self.get(&id) {
            Ok(existing) => existing,
            Err(StorageError::DocumentDoesNotExist { .. }) => Document::new(id),
            Err(err) => return Err(err),
        };
        merged.patch(document);
        self.set(merged)
    }

    /// Returns true if a document is stored at `id`.
    fn exists(&self, id: &str) -> StorageResult<bool>;

    /// Lists the immediate children of `folder`.
    fn list(&self, folder: &str) -> StorageResult<Vec<String>>;

    /// Removes the document stored at `id` and prunes empty ancestors.
    ///
    /// # Errors
    ///
    /// Returns `DocumentDoesNotExist` if nothing is stored at `id`.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// Removes every document under `folder`, then the folder itself.
    ///
    /// Succeeds if the folder does not exist.
    fn delete_folder(&self, folder: &str) -> StorageResult<()>;
}

/// Canonical form of `id` for backend use.
///
/// # Panics
///
/// Panics if `id` contains a `..` segment. The namespace is closed and no
/// caller may address anything outside it.
pub fn resolve_id(id: &str) -> String {
    assert!(
        !path::has_parent_traversal(id),
        "identifier escapes the namespace: {id:?}"
    );
    path::normalize(id)
}

/// Extracts the canonical, non-empty identifier of a document to be written.
pub fn document_id(document: &Document) -> StorageResult<String> {
    let id = resolve_id(document.id()?);
    if id.is_empty() || has_reserved_folder(&path::folder(&id)) {
        return Err(StorageError::InvalidId);
    }
    Ok(id)
}

/// Returns true if any segment of `folder` is a reserved folder name.
///
/// Documents can never be stored beneath such a folder.
pub fn has_reserved_folder(folder: &str) -> bool {
    path::segments(folder).any(|segment| {
        RESERVED_FOLDER_SUFFIXES
            .iter()
            .any(|suffix| segment.ends_with(suffix))
    })
}

/// Returns true if a `list` entry names a subfolder.
pub fn is_folder_entry(name: &str) -> bool {
    name.ends_with(FOLDER_SUFFIX)
}
