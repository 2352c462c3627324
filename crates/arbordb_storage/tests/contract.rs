//! Behavior every `DocumentStore` implementation must share.
//!
//! Each test runs once per backend.

use arbordb_codec::{Document, Value};
use arbordb_storage::{DocumentStore, FileBackend, InMemoryBackend, StorageError};
use tempfile::TempDir;

fn each_backend(test: impl Fn(&dyn DocumentStore)) {
    let memory = InMemoryBackend::new();
    test(&memory);

    let dir = TempDir::new().unwrap();
    let file = FileBackend::open(dir.path()).unwrap();
    test(&file);
}

fn movie(id: &str, name: &str) -> Document {
    Document::new(id).with("name", name)
}

#[test]
fn set_then_exists() {
    each_backend(|store| {
        store.set(movie("movies/matrix", "Matrix")).unwrap();

        assert!(store.exists("movies/matrix").unwrap());
        assert!(!store.exists("movies/nope").unwrap());
        assert!(!store.exists("movies").unwrap());
        assert!(!store.exists("").unwrap());
    });
}

#[test]
fn set_then_get_round_trips() {
    each_backend(|store| {
        let written = store.set(movie("movies/matrix", "Matrix")).unwrap();
        assert_eq!(written, movie("movies/matrix", "Matrix"));
        assert_eq!(store.get("movies/matrix").unwrap(), written);

        let err = store.get("movies/nope").unwrap_err();
        assert!(matches!(err, StorageError::DocumentDoesNotExist { ref id } if id == "movies/nope"));
    });
}

#[test]
fn set_rejects_missing_ids() {
    each_backend(|store| {
        assert!(matches!(
            store.set(Document::new("")),
            Err(StorageError::InvalidId)
        ));
        assert!(matches!(
            store.set(Document::empty().with("name", "x")),
            Err(StorageError::InvalidId)
        ));
        assert!(matches!(
            store.set(Document::empty()),
            Err(StorageError::EmptyDocument)
        ));
    });
}

#[test]
fn set_normalizes_id() {
    each_backend(|store| {
        let written = store.set(movie("/movies//matrix/", "Matrix")).unwrap();
        assert_eq!(written.id().unwrap(), "movies/matrix");
        assert_eq!(store.get("movies/matrix").unwrap(), written);
    });
}

#[test]
fn set_is_idempotent() {
    each_backend(|store| {
        store.set(movie("movies/matrix", "Matrix")).unwrap();
        store.set(movie("movies/matrix", "Matrix")).unwrap();

        assert_eq!(store.list("movies").unwrap(), vec!["matrix"]);
        assert_eq!(store.get("movies/matrix").unwrap(), movie("movies/matrix", "Matrix"));
    });
}

#[test]
fn list_children() {
    each_backend(|store| {
        store.set(movie("movies/matrix", "Matrix")).unwrap();

        assert_eq!(store.list("").unwrap(), vec!["movies/"]);
        assert_eq!(store.list("/").unwrap(), vec!["movies/"]);
        assert_eq!(store.list("movies").unwrap(), vec!["matrix"]);
        assert_eq!(store.list("movies/").unwrap(), vec!["matrix"]);
    });
}

#[test]
fn list_is_sorted_and_marks_subfolders() {
    each_backend(|store| {
        store.set(movie("movies/superman", "Superman")).unwrap();
        store.set(movie("movies/alien", "Alien")).unwrap();
        store.set(movie("movies/_indexes/by_name", "idx")).unwrap();
        store.set(movie("movies/matrix", "Matrix")).unwrap();

        assert_eq!(
            store.list("movies").unwrap(),
            vec!["_indexes/", "alien", "matrix", "superman"]
        );
    });
}

#[test]
fn list_missing_folder_is_empty() {
    each_backend(|store| {
        assert!(store.list("never/written").unwrap().is_empty());
        store.set(movie("movies/matrix", "Matrix")).unwrap();
        assert!(store.list("movies/matrix").unwrap().is_empty());
    });
}

#[test]
fn patch_merges_fields() {
    each_backend(|store| {
        store
            .set(movie("movies/matrix", "Matrix").with("desc", "wrong"))
            .unwrap();

        let patched = store
            .patch(Document::new("movies/matrix").with("desc", "right").with("year", 1999))
            .unwrap();

        let expected = movie("movies/matrix", "Matrix")
            .with("desc", "right")
            .with("year", 1999);
        assert_eq!(patched, expected);
        assert_eq!(store.get("movies/matrix").unwrap(), expected);
    });
}

#[test]
fn patch_creates_missing_document() {
    each_backend(|store| {
        let patched = store
            .patch(Document::new("movies/alien").with("year", 1979))
            .unwrap();
        assert_eq!(patched, Document::new("movies/alien").with("year", 1979));
        assert!(store.exists("movies/alien").unwrap());
    });
}

#[test]
fn patch_keeps_explicit_nulls() {
    each_backend(|store| {
        store.set(movie("movies/matrix", "Matrix")).unwrap();
        store
            .patch(Document::new("movies/matrix").with("name", Value::Null))
            .unwrap();

        let doc = store.get("movies/matrix").unwrap();
        assert!(doc.contains_key("name"));
        assert_eq!(doc.get("name"), None);
    });
}

#[test]
fn delete_removes_and_prunes() {
    each_backend(|store| {
        store.set(movie("movies/scifi/matrix", "Matrix")).unwrap();

        store.delete("movies/scifi/matrix").unwrap();

        assert!(!store.exists("movies/scifi/matrix").unwrap());
        assert!(store.list("movies").unwrap().is_empty());
        assert!(store.list("").unwrap().is_empty());
    });
}

#[test]
fn delete_missing_document_fails() {
    each_backend(|store| {
        assert!(store.delete("movies/nope").unwrap_err().is_not_found());
        assert!(store.delete("").unwrap_err().is_not_found());
    });
}

#[test]
fn delete_keeps_document_named_like_folder() {
    each_backend(|store| {
        store.set(movie("movies", "root movie")).unwrap();
        store.set(movie("movies/matrix", "Matrix")).unwrap();

        store.delete("movies/matrix").unwrap();

        assert_eq!(store.list("").unwrap(), vec!["movies"]);
        assert!(store.exists("movies").unwrap());
    });
}

#[test]
fn delete_folder_removes_subtree() {
    each_backend(|store| {
        store.set(movie("movies/_indexes/by_name", "idx")).unwrap();
        store.set(movie("movies/_indexes/by_name/Matrix", "m")).unwrap();
        store.set(movie("movies/_indexes/by_name/deep/x", "x")).unwrap();

        store.delete_folder("movies/_indexes/by_name").unwrap();

        assert_eq!(store.list("movies/_indexes").unwrap(), vec!["by_name"]);
        assert!(store.exists("movies/_indexes/by_name").unwrap());
    });
}

#[test]
fn delete_folder_missing_is_ok() {
    each_backend(|store| {
        store.delete_folder("nothing/here").unwrap();
    });
}

#[test]
fn delete_folder_prunes_emptied_parents() {
    each_backend(|store| {
        store.set(movie("a/b/c/x", "x")).unwrap();

        store.delete_folder("a/b/c").unwrap();

        assert!(store.list("").unwrap().is_empty());
    });
}

#[test]
fn folder_named_like_a_document_file_is_rejected() {
    each_backend(|store| {
        assert!(matches!(
            store.set(movie("a/b.json/x", "x")),
            Err(StorageError::InvalidId)
        ));
        assert!(matches!(
            store.patch(movie("a/b.json.tmp/x", "x")),
            Err(StorageError::InvalidId)
        ));

        store.set(movie("a/b", "b")).unwrap();
        store.set(movie("a/c.json", "c")).unwrap();
        assert_eq!(store.get("a/b").unwrap(), movie("a/b", "b"));
        assert_eq!(store.list("a").unwrap(), vec!["b", "c.json"]);
        assert!(store.get("a/b.json/x").unwrap_err().is_not_found());
        assert!(store.list("a/b.json").unwrap().is_empty());
        store.delete_folder("a/b.json").unwrap();
        assert!(store.exists("a/b").unwrap());
    });
}
