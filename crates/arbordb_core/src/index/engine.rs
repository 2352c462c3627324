//! Index Engine - full-rebuild maintenance of folder-local indexes.
//!
//! After every mutation the engine rebuilds every index defined next to the
//! mutated document:
//!
//! 1. Resolve the folder `F` whose indexes are affected
//! 2. Load every definition under `F/_indexes`
//! 3. Delete each index's derived-entry folder
//! 4. List the sibling documents of `F` (subfolders, `_indexes/` included,
//!    are not siblings)
//! 5. Evaluate every index function against every sibling and persist the
//!    emitted entries
//!
//! # Invariants
//!
//! - Derived entries are never updated in place; they are wiped and rebuilt
//! - A malformed definition fails the rebuild before anything is deleted
//! - The first evaluation or storage failure aborts the rebuild; indexes
//!   already wiped stay empty or partial until the next successful rebuild
//! - Siblings are processed in `list` order, so for duplicate keys the
//!   sibling listed last wins

use crate::error::{CoreError, CoreResult};
use crate::index::definition::{indexes_folder, rebuild_scope, IndexDefinition};
use crate::sandbox::{EvaluationError, Sandbox};
use arbordb_codec::path;
use arbordb_storage::{is_folder_entry, DocumentStore};
use serde::Serialize;
use tracing::debug;

/// What a rebuild touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// The folder whose indexes were rebuilt.
    pub folder: String,
    /// Number of index definitions found.
    pub indexes: usize,
    /// Number of sibling documents evaluated.
    pub siblings: usize,
    /// Number of derived entries written.
    pub emitted: usize,
}

/// Rebuilds folder-local indexes through a [`Sandbox`].
///
/// The engine holds no state about indexes between calls: definitions and
/// siblings are re-read from the store on every rebuild.
pub struct IndexEngine {
    sandbox: Box<dyn Sandbox>,
}

impl IndexEngine {
    /// Creates an engine evaluating functions with `sandbox`.
    pub fn new(sandbox: Box<dyn Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Rebuilds the indexes affected by a change to the document at `id`.
    pub fn on_document_modified(
        &self,
        store: &dyn DocumentStore,
        id: &str,
    ) -> CoreResult<RebuildReport> {
        self.rebuild_folder(store, &rebuild_scope(id))
    }

    /// Loads every index definition of `folder`.
    ///
    /// # Errors
    ///
    /// Fails on the first definition that cannot be read or parsed.
    pub fn load_indexes(
        &self,
        store: &dyn DocumentStore,
        folder: &str,
    ) -> CoreResult<Vec<IndexDefinition>> {
        let definitions_folder = indexes_folder(folder);

        store
            .list(&definitions_folder)?
            .into_iter()
            .filter(|name| !is_folder_entry(name))
            .map(|name| {
                let location = path::join(&definitions_folder, &name);
                let document = store.get(&location)?;
                IndexDefinition::from_document(&document).map_err(|err| match err {
                    CoreError::InvalidIndexDefinition { message, .. } => {
                        CoreError::invalid_index_definition(location, message)
                    }
                    other => other,
                })
            })
            .collect()
    }

    /// Wipes and recomputes every index of `folder`.
    pub fn rebuild_folder(
        &self,
        store: &dyn DocumentStore,
        folder: &str,
    ) -> CoreResult<RebuildReport> {
        let folder = path::normalize(folder);
        let indexes = self.load_indexes(store, &folder)?;
        let mut report = RebuildReport {
            folder: folder.clone(),
            indexes: indexes.len(),
            ..RebuildReport::default()
        };
        if indexes.is_empty() {
            return Ok(report);
        }

        for index in &indexes {
            store.delete_folder(&index.id)?;
        }

        for name in store.list(&folder)? {
            if is_folder_entry(&name) {
                continue;
            }
            let sibling_id = path::join(&folder, &name);
            let sibling = store.get(&sibling_id)?;
            report.siblings += 1;

            for index in &indexes {
                let emission = self
                    .sandbox
                    .evaluate(&sibling, &index.func)
                    .map_err(|err| CoreError::evaluation(&index.id, &sibling_id, err))?;
                let Some(emission) = emission else {
                    continue;
                };

                let entry_id = index.entry_id(&emission.key).map_err(|_| {
                    CoreError::evaluation(
                        &index.id,
                        &sibling_id,
                        EvaluationError::new(format!(
                            "emitted key {:?} does not name an entry inside the index",
                            emission.key
                        )),
                    )
                })?;

                let mut entry = emission.value;
                entry.set_id(entry_id);
                store.set(entry)?;
                report.emitted += 1;
            }
        }

        debug!(
            folder = %report.folder,
            indexes = report.indexes,
            siblings = report.siblings,
            emitted = report.emitted,
            "indexes rebuilt"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for IndexEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sandbox::Emission;
    use arbordb_codec::{Document, Value};
    use arbordb_storage::InMemoryBackend;

    /// Interprets `func` as the name of a field to index by; `"fail"` fails.
    struct FieldSandbox;

    impl Sandbox for FieldSandbox {
        fn evaluate(
            &self,
            document: &Document,
            source: &str,
        ) -> Result<Option<Emission>, EvaluationError> {
            if source == "fail" {
                return Err(EvaluationError::new("told to fail"));
            }
            Ok(document
                .get(source)
                .and_then(Value::as_text)
                .map(|key| Emission {
                    key: key.to_string(),
                    value: Document::empty().with("source", document.id().unwrap_or("")),
                }))
        }
    }

    fn engine() -> IndexEngine {
        IndexEngine::new(Box::new(FieldSandbox))
    }

    fn seed(store: &InMemoryBackend, docs: &[(&str, &str)]) {
        for (id, name) in docs {
            store.set(Document::new(*id).with("name", *name)).unwrap();
        }
    }

    #[test]
    fn no_indexes_is_a_no_op() {
        let store = InMemoryBackend::new();
        seed(&store, &[("movies/matrix", "Matrix")]);

        let report = engine().on_document_modified(&store, "movies/matrix").unwrap();
        assert_eq!(report.indexes, 0);
        assert_eq!(report.siblings, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rebuild_emits_one_entry_per_sibling() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix"), ("movies/superman", "Superman")]);

        let report = engine().on_document_modified(&store, "movies/matrix").unwrap();

        assert_eq!(
            report,
            RebuildReport {
                folder: "movies".into(),
                indexes: 1,
                siblings: 2,
                emitted: 2,
            }
        );
        assert_eq!(
            store.list("movies/_indexes/by_name").unwrap(),
            vec!["Matrix", "Superman"]
        );
        assert_eq!(
            store.get("movies/_indexes/by_name/Matrix").unwrap(),
            Document::new("movies/_indexes/by_name/Matrix").with("source", "movies/matrix")
        );
    }

    #[test]
    fn stale_entries_are_wiped() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        store
            .set(Document::new("movies/_indexes/by_name/Ghost"))
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix")]);

        engine().on_document_modified(&store, "movies/matrix").unwrap();

        assert_eq!(store.list("movies/_indexes/by_name").unwrap(), vec!["Matrix"]);
    }

    #[test]
    fn duplicate_keys_last_sibling_wins() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(&store, &[("movies/b", "Same"), ("movies/a", "Same")]);

        engine().rebuild_folder(&store, "movies").unwrap();

        assert_eq!(
            store.get("movies/_indexes/by_name/Same").unwrap().get("source"),
            Some(&Value::from("movies/b"))
        );
    }

    #[test]
    fn skipped_siblings_emit_nothing() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_title", "title").to_document())
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix")]);

        let report = engine().rebuild_folder(&store, "movies").unwrap();
        assert_eq!(report.emitted, 0);
        assert!(store.list("movies/_indexes/by_title").unwrap().is_empty());
    }

    #[test]
    fn derived_folders_are_not_definitions() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix")]);
        engine().rebuild_folder(&store, "movies").unwrap();

        let indexes = engine().load_indexes(&store, "movies").unwrap();
        assert_eq!(indexes.len(), 1);
    }

    #[test]
    fn malformed_definition_fails_before_wiping() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix")]);
        engine().rebuild_folder(&store, "movies").unwrap();

        store
            .set(Document::new("movies/_indexes/broken").with("name", "no func"))
            .unwrap();
        let err = engine().rebuild_folder(&store, "movies").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidIndexDefinition);
        assert!(err.to_string().contains("movies/_indexes/broken"));
        assert!(store.exists("movies/_indexes/by_name/Matrix").unwrap());
    }

    #[test]
    fn evaluation_failure_aborts() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/bad", "fail").to_document())
            .unwrap();
        seed(&store, &[("movies/matrix", "Matrix")]);

        let err = engine().rebuild_folder(&store, "movies").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert!(err.to_string().contains("movies/matrix"));
    }

    #[test]
    fn escaping_key_is_evaluation_error() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(&store, &[("movies/evil", "../../x")]);

        let err = engine().rebuild_folder(&store, "movies").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn subfolder_documents_are_not_siblings() {
        let store = InMemoryBackend::new();
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();
        seed(
            &store,
            &[("movies/matrix", "Matrix"), ("movies/scifi/alien", "Alien")],
        );

        let report = engine().rebuild_folder(&store, "movies").unwrap();
        assert_eq!(report.siblings, 1);
        assert_eq!(store.list("movies/_indexes/by_name").unwrap(), vec!["Matrix"]);
    }

    #[test]
    fn definition_change_rebuilds_owner_folder() {
        let store = InMemoryBackend::new();
        seed(&store, &[("movies/matrix", "Matrix")]);
        store
            .set(IndexDefinition::new("movies/_indexes/by_name", "name").to_document())
            .unwrap();

        let report = engine()
            .on_document_modified(&store, "movies/_indexes/by_name")
            .unwrap();
        assert_eq!(report.folder, "movies");
        assert!(store.exists("movies/_indexes/by_name/Matrix").unwrap());
    }
}
