//! Backend equivalence harness.
//!
//! Replays one operation sequence against an [`InMemoryBackend`] and a
//! [`FileBackend`] and reports the first observable difference: the outcome
//! of an operation, the documents reachable through `list`, or a listing.

use crate::generators::Operation;
use arbordb_codec::{path, Document};
use arbordb_core::{Config, CoreError, Database, ErrorKind};
use arbordb_storage::{
    is_folder_entry, DocumentStore, FileBackend, InMemoryBackend, StorageResult,
};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// What a caller can observe from a single operation.
pub type Outcome = Result<Option<Document>, ErrorKind>;

/// Everything reachable from the root: every listing and every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceSnapshot {
    /// Listing of every reachable folder, keyed by folder id.
    pub listings: BTreeMap<String, Vec<String>>,
    /// Every reachable document, keyed by id.
    pub documents: BTreeMap<String, Document>,
}

impl NamespaceSnapshot {
    /// Walks `store` from the root.
    pub fn capture(store: &dyn DocumentStore) -> StorageResult<Self> {
        let mut snapshot = Self::default();
        let mut pending = vec![String::new()];

        while let Some(folder) = pending.pop() {
            let names = store.list(&folder)?;
            for name in &names {
                if is_folder_entry(name) {
                    pending.push(path::join(&folder, name));
                } else {
                    let id = path::join(&folder, name);
                    let document = store.get(&id)?;
                    snapshot.documents.insert(id, document);
                }
            }
            snapshot.listings.insert(folder, names);
        }

        Ok(snapshot)
    }
}

/// Applies a storage-level operation.
///
/// [`Operation::DefineIndex`] is written as a plain document.
pub fn apply_to_store(store: &dyn DocumentStore, operation: &Operation) -> Outcome {
    let result = match operation {
        Operation::Set { document } => store.set(document.clone()).map(Some),
        Operation::Patch { document } => store.patch(document.clone()).map(Some),
        Operation::Delete { id } => store.delete(id).map(|()| None),
        Operation::DeleteFolder { folder } => store.delete_folder(folder).map(|()| None),
        Operation::DefineIndex { folder } => {
            store.set(Operation::index_definition(folder)).map(Some)
        }
    };
    result.map_err(|err| CoreError::from(err).kind())
}

/// Applies an operation through the database facade.
pub fn apply_to_database(db: &Database, operation: &Operation) -> Outcome {
    let result = match operation {
        Operation::Set { document } => db.set(document.clone()).map(Some),
        Operation::Patch { document } => db.patch(document.clone()).map(Some),
        Operation::Delete { id } => db.delete(id).map(|()| None),
        Operation::DeleteFolder { folder } => db.delete_folder(folder).map(|()| None),
        Operation::DefineIndex { folder } => {
            db.set(Operation::index_definition(folder)).map(Some)
        }
    };
    result.map_err(|err| err.kind())
}

/// A difference between the two backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Divergence {
    /// Operation `step` produced different outcomes.
    Outcome {
        /// Index of the operation in the sequence.
        step: usize,
        /// The operation.
        operation: String,
        /// Outcome on the in-memory backend.
        memory: Outcome,
        /// Outcome on the file backend.
        file: Outcome,
    },
    /// The namespaces differ after the whole sequence.
    Namespace {
        /// Snapshot of the in-memory backend.
        memory: NamespaceSnapshot,
        /// Snapshot of the file backend.
        file: NamespaceSnapshot,
    },
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outcome {
                step,
                operation,
                memory,
                file,
            } => write!(
                f,
                "step {step} ({operation}): memory={memory:?} file={file:?}"
            ),
            Self::Namespace { memory, file } => {
                write!(f, "namespaces differ:\nmemory={memory:#?}\nfile={file:#?}")
            }
        }
    }
}

/// Replays `operations` directly against both backends.
pub fn compare_stores(operations: &[Operation]) -> Result<(), Divergence> {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let memory = InMemoryBackend::new();
    let file = FileBackend::open(temp_dir.path())
        .expect("Failed to open file backend")
        .sync_writes(false);

    replay(
        operations,
        |operation| apply_to_store(&memory, operation),
        |operation| apply_to_store(&file, operation),
    )?;
    compare_snapshots(&memory, &file)
}

/// Replays `operations` through a database over each backend, indexes
/// included.
pub fn compare_databases(operations: &[Operation]) -> Result<(), Divergence> {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let memory = Database::open_in_memory().expect("Failed to open in-memory database");
    let file = Database::open_with_config(temp_dir.path(), Config::default().sync_writes(false))
        .expect("Failed to open file database");

    replay(
        operations,
        |operation| apply_to_database(&memory, operation),
        |operation| apply_to_database(&file, operation),
    )?;
    compare_snapshots(memory.store(), file.store())
}

fn replay(
    operations: &[Operation],
    memory: impl Fn(&Operation) -> Outcome,
    file: impl Fn(&Operation) -> Outcome,
) -> Result<(), Divergence> {
    for (step, operation) in operations.iter().enumerate() {
        let memory_outcome = memory(operation);
        let file_outcome = file(operation);
        if memory_outcome != file_outcome {
            return Err(Divergence::Outcome {
                step,
                operation: format!("{operation:?}"),
                memory: memory_outcome,
                file: file_outcome,
            });
        }
    }
    Ok(())
}

fn compare_snapshots(
    memory: &dyn DocumentStore,
    file: &dyn DocumentStore,
) -> Result<(), Divergence> {
    let memory = NamespaceSnapshot::capture(memory).expect("Failed to walk in-memory backend");
    let file = NamespaceSnapshot::capture(file).expect("Failed to walk file backend");
    if memory == file {
        Ok(())
    } else {
        Err(Divergence::Namespace { memory, file })
    }
}
