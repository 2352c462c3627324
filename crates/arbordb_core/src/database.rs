//! Database facade.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::index::{is_index_definition, IndexEngine, RebuildReport};
use crate::sandbox::{JsSandbox, Sandbox};
use arbordb_codec::{path, Document};
use arbordb_storage::{DocumentStore, FileBackend, InMemoryBackend};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// A document together with the names stored beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// The document stored at the identifier, if any.
    pub document: Option<Document>,
    /// Immediate children, as returned by [`Database::list`].
    pub children: Vec<String>,
}

/// The main database handle.
///
/// `Database` ties a [`DocumentStore`] to the [`IndexEngine`]. Every
/// mutation persists the primary document first and then rebuilds the
/// indexes of the affected folder, so derived entries always reflect the
/// last successful mutation.
///
/// # Opening a Database
///
/// ```rust
/// use arbordb_codec::Document;
/// use arbordb_core::Database;
///
/// let db = Database::open_in_memory().unwrap();
/// db.set(
///     Document::new("movies/_indexes/by_name")
///         .with("func", "(doc) => [doc.name, {b: doc.id}]"),
/// )
/// .unwrap();
/// db.set(Document::new("movies/matrix").with("name", "Matrix")).unwrap();
///
/// assert_eq!(db.list("movies/_indexes/by_name").unwrap(), vec!["Matrix"]);
/// ```
///
/// # Concurrency
///
/// Mutations are serialized by a single lock held across the write and the
/// rebuild that follows it. Reads take no lock and may observe an index in
/// the middle of a rebuild.
///
/// # Failure
///
/// A failed rebuild fails the mutation but does not undo the primary
/// write. The affected indexes stay wiped or partial until the next
/// successful mutation in that folder, or an explicit [`Database::reindex`].
pub struct Database {
    /// Configuration.
    config: Config,
    /// Storage backend shared by the facade and the index engine.
    store: Box<dyn DocumentStore>,
    /// Index maintenance.
    engine: IndexEngine,
    /// Serializes mutations.
    write_lock: Mutex<()>,
}

impl Database {
    /// Opens a file-backed database rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root directory cannot be created.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a file-backed database with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use arbordb_core::{Config, Database};
    /// use std::path::Path;
    ///
    /// let config = Config::default().create_if_missing(false).sync_writes(false);
    /// let db = Database::open_with_config(Path::new("_data"), config).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root cannot be created, or if it is
    /// missing and `create_if_missing` is false.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let backend = if config.create_if_missing {
            FileBackend::open(path)?
        } else {
            FileBackend::open_existing(path)?
        };
        let backend = backend.sync_writes(config.sync_writes);

        info!(root = %path.display(), "database opened");
        Ok(Self::with_store(Box::new(backend), config))
    }

    /// Opens an ephemeral database backed by memory.
    pub fn open_in_memory() -> CoreResult<Self> {
        Ok(Self::with_store(
            Box::new(InMemoryBackend::new()),
            Config::default(),
        ))
    }

    /// Creates a database over an existing store.
    pub fn with_store(store: Box<dyn DocumentStore>, config: Config) -> Self {
        let engine = IndexEngine::new(Box::new(JsSandbox::new(config.sandbox)));
        Self {
            config,
            store,
            engine,
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the sandbox used to run mapping functions.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: Box<dyn Sandbox>) -> Self {
        self.engine = IndexEngine::new(sandbox);
        self
    }

    /// Returns the database configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the underlying store. Writes made through it do not
    /// trigger index rebuilds.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Stores `document` at its id, replacing any existing document, and
    /// rebuilds the affected indexes.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDocument` or `InvalidId` for a document without a usable
    /// id. Index failures are returned after the document has been written.
    pub fn set(&self, document: Document) -> CoreResult<Document> {
        check_document(&document)?;
        let _guard = self.write_lock.lock();

        let stored = self.store.set(document)?;
        let id = stored.id()?;
        info!(id = %id, "document set");
        self.rebuild_after(id)?;
        Ok(stored)
    }

    /// Shallow-merges `document` over the stored one (creating it if
    /// missing) and rebuilds the affected indexes.
    pub fn patch(&self, document: Document) -> CoreResult<Document> {
        check_document(&document)?;
        let _guard = self.write_lock.lock();

        let stored = self.store.patch(document)?;
        let id = stored.id()?;
        info!(id = %id, "document patched");
        self.rebuild_after(id)?;
        Ok(stored)
    }

    /// Loads the document stored at `id`.
    pub fn get(&self, id: &str) -> CoreResult<Document> {
        check_id(id)?;
        Ok(self.store.get(id)?)
    }

    /// Returns true if a document is stored at `id`.
    pub fn exists(&self, id: &str) -> CoreResult<bool> {
        check_id(id)?;
        Ok(self.store.exists(id)?)
    }

    /// Lists the immediate children of `id`; subfolders end in `/`.
    pub fn list(&self, id: &str) -> CoreResult<Vec<String>> {
        check_id(id)?;
        Ok(self.store.list(id)?)
    }

    /// Returns the document at `id` (if any) along with its children.
    pub fn describe(&self, id: &str) -> CoreResult<Node> {
        check_id(id)?;
        let document = match self.store.get(id) {
            Ok(document) => Some(document),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };
        let children = self.store.list(id)?;
        Ok(Node { document, children })
    }

    /// Removes the document stored at `id` and rebuilds the affected
    /// indexes. Removing an index definition also removes its entries.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        check_id(id)?;
        let _guard = self.write_lock.lock();

        self.store.delete(id)?;
        let id = path::normalize(id);
        if is_index_definition(&id) {
            self.store.delete_folder(&id)?;
        }
        info!(id = %id, "document deleted");
        self.rebuild_after(&id)?;
        Ok(())
    }

    /// Removes every document under `folder`.
    ///
    /// The indexes of the enclosing folder are rebuilt afterwards, which
    /// restores an index's entries if `folder` was its derived folder.
    pub fn delete_folder(&self, folder: &str) -> CoreResult<()> {
        check_id(folder)?;
        let _guard = self.write_lock.lock();

        self.store.delete_folder(folder)?;
        let folder = path::normalize(folder);
        info!(folder = %folder, "folder deleted");
        if !folder.is_empty() {
            self.rebuild_after(&folder)?;
        }
        Ok(())
    }

    /// Rebuilds every index defined in `folder`.
    pub fn reindex(&self, folder: &str) -> CoreResult<RebuildReport> {
        check_id(folder)?;
        let _guard = self.write_lock.lock();

        let report = self.engine.rebuild_folder(self.store.as_ref(), folder)?;
        info!(
            folder = %report.folder,
            indexes = report.indexes,
            emitted = report.emitted,
            "folder reindexed"
        );
        Ok(report)
    }

    fn rebuild_after(&self, id: &str) -> CoreResult<RebuildReport> {
        self.engine
            .on_document_modified(self.store.as_ref(), id)
            .map_err(|err| {
                warn!(id = %id, error = %err, "index rebuild failed");
                err
            })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Rejects identifiers that would leave the namespace.
fn check_id(id: &str) -> CoreResult<()> {
    if path::has_parent_traversal(id) {
        return Err(CoreError::invalid_id());
    }
    Ok(())
}

fn check_document(document: &Document) -> CoreResult<()> {
    match document.id() {
        Ok(id) => check_id(id),
        // Missing or malformed ids are reported by the store.
        Err(_) => Ok(()),
    }
}
