//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use arbordb_core::{Config, Database};
use std::path::Path;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory().expect("Failed to open in-memory database"),
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database in a temporary directory.
    ///
    /// Writes are not fsynced; the directory disappears with the fixture.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::default().sync_writes(false);
        let db = Database::open_with_config(temp_dir.path(), config)
            .expect("Failed to open file database");

        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the root directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use arbordb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     assert!(db.list("").unwrap().is_empty());
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, path)
}

/// Runs the same test against a fresh in-memory and a fresh file database.
pub fn with_each_backend<F>(f: F)
where
    F: Fn(&Database),
{
    f(&TestDatabase::memory().db);
    f(&TestDatabase::file().db);
}

/// Test scenario helpers.
pub mod scenarios {
    use arbordb_codec::Document;
    use arbordb_core::Database;

    /// Mapping function indexing movies by name.
    pub const BY_NAME: &str = "(doc) => [doc.name, {b: doc.id}]";

    /// Defines `movies/_indexes/by_name` and writes Matrix and Superman.
    pub fn movies(db: &Database) {
        db.set(Document::new("movies/_indexes/by_name").with("func", BY_NAME))
            .expect("Failed to define index");
        db.set(Document::new("movies/matrix").with("name", "Matrix"))
            .expect("Failed to set movie");
        db.set(Document::new("movies/superman").with("name", "Superman"))
            .expect("Failed to set movie");
    }

    /// Writes `count` documents named `doc-<n>` into `folder`.
    pub fn populated_folder(db: &Database, folder: &str, count: usize) {
        for i in 0..count {
            db.set(
                Document::new(format!("{folder}/doc-{i:05}"))
                    .with("name", format!("name-{i:05}"))
                    .with("rank", i as i64),
            )
            .expect("Failed to set document");
        }
    }
}
