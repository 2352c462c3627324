//! File-based storage backend for persistent storage.

use crate::backend::{document_id, has_reserved_folder, resolve_id, DocumentStore, FOLDER_SUFFIX};
use crate::error::{StorageError, StorageResult};
use arbordb_codec::{path, Document};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Extension of document files.
const DOCUMENT_EXTENSION: &str = ".json";
/// Suffix of the temporary file written before the atomic rename.
const TEMP_SUFFIX: &str = ".tmp";

/// A directory-tree storage backend.
///
/// Every document lives at `<root>/<id>.json`; intermediate identifier
/// segments are ordinary directories. There is no manifest and no log:
/// crash consistency relies on the write protocol alone.
///
/// # Durability
///
/// Writes use the write-then-rename pattern:
/// 1. Write the encoded document to `<target>.tmp`
/// 2. Sync the temporary file to disk
/// 3. Rename it over the target (atomic on POSIX filesystems)
/// 4. Fsync the parent directory so the rename itself is durable
///
/// The existing file is never removed first, so a crash leaves either the
/// old or the new document in place. Steps 2 and 4 can be turned off with
/// [`FileBackend::sync_writes`].
///
/// # Example
///
/// ```no_run
/// use arbordb_codec::Document;
/// use arbordb_storage::{DocumentStore, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("_data")).unwrap();
/// backend.set(Document::new("movies/matrix").with("name", "Matrix")).unwrap();
/// assert_eq!(backend.list("movies").unwrap(), vec!["matrix"]);
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    sync_writes: bool,
}

impl FileBackend {
    /// Opens a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `root` is not
    /// a directory.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Self::open_existing(root)
    }

    /// Opens a backend rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or is not a directory.
    pub fn open_existing(root: &Path) -> StorageResult<Self> {
        let metadata = fs::metadata(root)?;
        if !metadata.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("storage root is not a directory: {}", root.display()),
            )));
        }

        Ok(Self {
            root: root.to_path_buf(),
            sync_writes: true,
        })
    }

    /// Sets whether writes are fsynced before and after the rename.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Returns the root directory of the namespace.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a folder identifier to its directory.
    fn folder_path(&self, folder: &str) -> PathBuf {
        let mut dir = self.root.clone();
        dir.extend(path::segments(&resolve_id(folder)));
        dir
    }

    /// Maps a document identifier to its file. `id` must be canonical and
    /// non-empty.
    fn document_path(&self, id: &str) -> PathBuf {
        self.folder_path(&path::folder(id))
            .join(format!("{}{DOCUMENT_EXTENSION}", path::name(id)))
    }

    fn read_document(&self, id: &str) -> StorageResult<Document> {
        let file_path = self.document_path(id);
        let bytes = match fs::read(&file_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(id));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Document::from_json_slice(&bytes)?)
    }

    fn write_document(&self, id: &str, document: &Document) -> StorageResult<()> {
        let target = self.document_path(id);
        let parent = self.folder_path(&path::folder(id));
        fs::create_dir_all(&parent)?;

        let data = document.to_json_vec()?;
        let mut temp_name = target.clone().into_os_string();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        if let Err(err) = self.write_temp(&temp_path, &data) {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp_path, &target) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        if self.sync_writes {
            sync_directory(&parent)?;
        }

        trace!(id, bytes = data.len(), "document written");
        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(data)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Walks upward from `folder`, removing empty directories until a
    /// non-empty one or the root is reached.
    fn prune_empty_folders(&self, folder: &str) -> StorageResult<()> {
        let mut current = path::normalize(folder);

        while !current.is_empty() {
            let dir = self.folder_path(&current);
            match fs::read_dir(&dir) {
                Ok(mut entries) => {
                    if entries.next().is_some() {
                        break;
                    }
                    match fs::remove_dir(&dir) {
                        Ok(()) => debug!(folder = %current, "pruned empty folder"),
                        Err(err) if err.kind() == ErrorKind::NotFound => {}
                        Err(err) => return Err(err.into()),
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
            current = path::folder(&current);
        }

        Ok(())
    }
}

impl DocumentStore for FileBackend {
    fn get(&self, id: &str) -> StorageResult<Document> {
        let id = resolve_id(id);
        if id.is_empty() || has_reserved_folder(&path::folder(&id)) {
            return Err(StorageError::not_found(id));
        }
        self.read_document(&id)
    }

    fn set(&self, mut document: Document) -> StorageResult<Document> {
        let id = document_id(&document)?;
        document.set_id(id.clone());
        self.write_document(&id, &document)?;
        Ok(document)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let id = resolve_id(id);
        if id.is_empty() || has_reserved_folder(&path::folder(&id)) {
            return Ok(false);
        }
        match fs::metadata(self.document_path(&id)) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self, folder: &str) -> StorageResult<Vec<String>> {
        let dir = self.folder_path(folder);
        if has_reserved_folder(folder) || !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                names.push(format!("{file_name}{FOLDER_SUFFIX}"));
            } else if let Some(name) = file_name.strip_suffix(DOCUMENT_EXTENSION) {
                if file_type.is_file() && !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let id = resolve_id(id);
        if id.is_empty() || has_reserved_folder(&path::folder(&id)) {
            return Err(StorageError::not_found(id));
        }

        match fs::remove_file(self.document_path(&id)) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(id));
            }
            Err(err) => return Err(err.into()),
        }

        self.prune_empty_folders(&path::folder(&id))
    }

    fn delete_folder(&self, folder: &str) -> StorageResult<()> {
        let folder = resolve_id(folder);
        if has_reserved_folder(&folder) {
            // Such a path can only be a document file, never a folder.
            return Ok(());
        }
        let dir = self.folder_path(&folder);

        if folder.is_empty() {
            // The root directory itself stays; only its contents go.
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(entry.path())?;
                } else {
                    fs::remove_file(entry.path())?;
                }
            }
            return Ok(());
        }

        match fs::remove_dir_all(&dir) {
            Ok(()) => debug!(folder = %folder, "folder removed"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        self.prune_empty_folders(&path::folder(&folder))
    }
}

/// Syncs a directory so that entry creation, rename and removal are durable.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> StorageResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> StorageResult<()> {
    // NTFS journals metadata updates; directory handles cannot be fsynced.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn movie(id: &str, name: &str) -> Document {
        Document::new(id).with("name", name)
    }

    #[test]
    fn open_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("data");

        let backend = FileBackend::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root);
    }

    #[test]
    fn open_existing_requires_directory() {
        let dir = tempdir().unwrap();
        assert!(FileBackend::open_existing(&dir.path().join("missing")).is_err());

        let file_path = dir.path().join("file");
        fs::write(&file_path, b"x").unwrap();
        assert!(FileBackend::open_existing(&file_path).is_err());
    }

    #[test]
    fn document_layout_on_disk() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("movies/matrix", "Matrix")).unwrap();

        let file_path = dir.path().join("movies").join("matrix.json");
        assert!(file_path.is_file());

        let stored = Document::from_json_slice(&fs::read(&file_path).unwrap()).unwrap();
        assert_eq!(stored, movie("movies/matrix", "Matrix"));
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("movies/matrix", "Matrix")).unwrap();
        backend.set(movie("movies/matrix", "The Matrix")).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path().join("movies"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["matrix.json".to_string()]);
        assert_eq!(
            backend.get("movies/matrix").unwrap(),
            movie("movies/matrix", "The Matrix")
        );
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap().sync_writes(false);
        // A non-empty directory where the document file belongs makes the rename fail.
        fs::create_dir_all(dir.path().join("movies").join("matrix.json").join("inner")).unwrap();

        assert!(matches!(
            backend.set(movie("movies/matrix", "Matrix")),
            Err(StorageError::Io(_))
        ));
        assert!(!dir.path().join("movies").join("matrix.json.tmp").exists());
    }

    #[test]
    fn reserved_folder_names_never_reach_the_disk() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("a/b", "b")).unwrap();

        assert!(matches!(
            backend.set(movie("a/b.json/x", "x")),
            Err(StorageError::InvalidId)
        ));
        assert!(dir.path().join("a").join("b.json").is_file());
        assert!(backend.get("a/b.json/x").unwrap_err().is_not_found());
        assert!(!backend.exists("a/b.json/x").unwrap());
        assert!(backend.list("a/b.json").unwrap().is_empty());
        backend.delete_folder("a/b.json").unwrap();
        assert_eq!(backend.get("a/b").unwrap(), movie("a/b", "b"));
    }

    #[test]
    fn list_ignores_stray_files() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("movies/matrix", "Matrix")).unwrap();

        let movies = dir.path().join("movies");
        fs::write(movies.join("superman.json.tmp"), b"{").unwrap();
        fs::write(movies.join("notes.txt"), b"hello").unwrap();

        assert_eq!(backend.list("movies").unwrap(), vec!["matrix"]);
    }

    #[test]
    fn corrupted_document_is_codec_error() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("movies")).unwrap();
        fs::write(dir.path().join("movies").join("broken.json"), b"{not json").unwrap();

        assert!(matches!(
            backend.get("movies/broken"),
            Err(StorageError::Codec(_))
        ));
    }

    #[test]
    fn delete_prunes_up_to_first_non_empty_folder() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("a/keep", "keep")).unwrap();
        backend.set(movie("a/b/c/d", "deep")).unwrap();

        backend.delete("a/b/c/d").unwrap();

        assert!(!dir.path().join("a").join("b").exists());
        assert!(dir.path().join("a").is_dir());
        assert!(dir.path().is_dir());
        assert_eq!(backend.list("a").unwrap(), vec!["keep"]);
    }

    #[test]
    fn delete_root_folder_keeps_root_directory() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("top", "t")).unwrap();
        backend.set(movie("movies/matrix", "Matrix")).unwrap();

        backend.delete_folder("").unwrap();

        assert!(dir.path().is_dir());
        assert!(backend.list("").unwrap().is_empty());
    }

    #[test]
    fn persistence_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let backend = FileBackend::open(dir.path()).unwrap();
            backend.set(movie("movies/matrix", "Matrix")).unwrap();
        }

        let backend = FileBackend::open_existing(dir.path()).unwrap();
        assert_eq!(
            backend.get("movies/matrix").unwrap(),
            movie("movies/matrix", "Matrix")
        );
    }

    #[test]
    fn unsynced_writes_still_land() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap().sync_writes(false);
        backend.set(movie("movies/matrix", "Matrix")).unwrap();
        assert!(backend.exists("movies/matrix").unwrap());
    }

    #[test]
    fn names_with_dots_keep_their_extension() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(movie("releases/v1.2", "one-two")).unwrap();

        assert!(dir.path().join("releases").join("v1.2.json").is_file());
        assert_eq!(backend.list("releases").unwrap(), vec!["v1.2"]);
    }

    #[test]
    #[should_panic(expected = "escapes the namespace")]
    fn traversal_panics() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let _ = backend.get("../outside");
    }
}
