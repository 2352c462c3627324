//! In-memory storage backend for testing.

use crate::backend::{document_id, resolve_id, DocumentStore, FOLDER_SUFFIX};
use crate::error::{StorageError, StorageResult};
use arbordb_codec::Document;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An in-memory storage backend.
///
/// Documents are kept in a map keyed by canonical identifier. Folders have
/// no representation of their own: listing scans every key under the folder
/// prefix and buckets by the next segment, so an emptied folder disappears
/// without any pruning step.
///
/// This backend is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Example
///
/// ```rust
/// use arbordb_codec::Document;
/// use arbordb_storage::{DocumentStore, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.set(Document::new("movies/matrix")).unwrap();
/// assert_eq!(backend.list("").unwrap(), vec!["movies/"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a sorted copy of every stored document.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Document> {
        self.documents
            .read()
            .iter()
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Removes every document.
    pub fn clear(&self) {
        self.documents.write().clear();
    }
}

/// Key prefix shared by every document under `folder`.
fn folder_prefix(folder: &str) -> String {
    if folder.is_empty() {
        String::new()
    } else {
        format!("{folder}{FOLDER_SUFFIX}")
    }
}

impl DocumentStore for InMemoryBackend {
    fn get(&self, id: &str) -> StorageResult<Document> {
        let id = resolve_id(id);
        self.documents
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id))
    }

    fn set(&self, mut document: Document) -> StorageResult<Document> {
        let id = document_id(&document)?;
        document.set_id(id.clone());
        self.documents.write().insert(id, document.clone());
        Ok(document)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let id = resolve_id(id);
        Ok(self.documents.read().contains_key(&id))
    }

    fn list(&self, folder: &str) -> StorageResult<Vec<String>> {
        let prefix = folder_prefix(&resolve_id(folder));
        let documents = self.documents.read();

        let names: BTreeSet<String> = documents
            .keys()
            .filter_map(|id| id.strip_prefix(prefix.as_str()))
            .map(|rest| match rest.split_once(FOLDER_SUFFIX) {
                Some((head, _)) => format!("{head}{FOLDER_SUFFIX}"),
                None => rest.to_string(),
            })
            .collect();

        Ok(names.into_iter().collect())
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let id = resolve_id(id);
        match self.documents.write().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(id)),
        }
    }

    fn delete_folder(&self, folder: &str) -> StorageResult<()> {
        let prefix = folder_prefix(&resolve_id(folder));
        self.documents
            .write()
            .retain(|id, _| !id.starts_with(prefix.as_str()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.is_empty());
        assert!(backend.list("").unwrap().is_empty());
    }

    #[test]
    fn list_is_segment_aligned() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("movies/matrix")).unwrap();
        backend.set(Document::new("movies2/alien")).unwrap();

        assert_eq!(backend.list("movies").unwrap(), vec!["matrix"]);
        assert_eq!(backend.list("").unwrap(), vec!["movies/", "movies2/"]);
    }

    #[test]
    fn list_reports_document_and_folder_of_same_name() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("movies/_indexes/by_name")).unwrap();
        backend.set(Document::new("movies/_indexes/by_name/Matrix")).unwrap();
        backend.set(Document::new("movies/_indexes/by_name/Alien")).unwrap();

        assert_eq!(
            backend.list("movies/_indexes").unwrap(),
            vec!["by_name", "by_name/"]
        );
    }

    #[test]
    fn delete_folder_spares_siblings_with_common_prefix() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("a/b/x")).unwrap();
        backend.set(Document::new("a/bb/y")).unwrap();
        backend.set(Document::new("a/b")).unwrap();

        backend.delete_folder("a/b").unwrap();

        assert!(backend.exists("a/bb/y").unwrap());
        assert!(backend.exists("a/b").unwrap());
        assert!(!backend.exists("a/b/x").unwrap());
    }

    #[test]
    fn delete_root_folder_clears_everything() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("a/b")).unwrap();
        backend.set(Document::new("c")).unwrap();

        backend.delete_folder("/").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn stored_copy_is_independent_of_patch_input() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("a").with("x", 1)).unwrap();
        let before = backend.get("a").unwrap();

        backend.patch(Document::new("a").with("y", 2)).unwrap();

        assert_eq!(before, Document::new("a").with("x", 1));
        assert_eq!(backend.get("a").unwrap(), Document::new("a").with("x", 1).with("y", 2));
    }

    #[test]
    fn snapshot_and_clear() {
        let backend = InMemoryBackend::new();
        backend.set(Document::new("b")).unwrap();
        backend.set(Document::new("a")).unwrap();

        let keys: Vec<_> = backend.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(backend.len(), 2);

        backend.clear();
        assert!(backend.is_empty());
    }
}
