//! Folder commands.

use super::CommandResult;
use arbordb_core::Database;

/// Lists the children of `folder`.
pub fn list(db: &Database, folder: &str) -> CommandResult {
    Ok(serde_json::to_value(db.list(folder)?)?)
}

/// Deletes `folder` and everything beneath it.
pub fn delete(db: &Database, folder: &str) -> CommandResult {
    db.delete_folder(folder)?;
    Ok(serde_json::Value::from("deleted"))
}

/// Rebuilds every index defined in `folder`.
pub fn reindex(db: &Database, folder: &str) -> CommandResult {
    Ok(serde_json::to_value(db.reindex(folder)?)?)
}
