//! Single-document commands.

use super::{CommandError, CommandResult};
use arbordb_codec::{Document, Value, ID_FIELD};
use arbordb_core::Database;
use tracing::debug;

/// Shows the document at `id` and its children.
pub fn get(db: &Database, id: &str) -> CommandResult {
    Ok(serde_json::to_value(db.describe(id)?)?)
}

/// Replaces the document at `id`.
pub fn set(db: &Database, id: &str, fields: &[String], body: Option<&str>) -> CommandResult {
    let document = build_document(id, fields, body)?;
    let stored = db.set(document)?;
    describe_written(db, &stored)
}

/// Merges fields into the document at `id`.
pub fn patch(db: &Database, id: &str, fields: &[String], body: Option<&str>) -> CommandResult {
    let document = build_document(id, fields, body)?;
    let stored = db.patch(document)?;
    describe_written(db, &stored)
}

/// Deletes the document at `id`.
pub fn delete(db: &Database, id: &str) -> CommandResult {
    db.delete(id)?;
    Ok(serde_json::Value::from("deleted"))
}

/// Reports whether a document exists at `id`.
pub fn exists(db: &Database, id: &str) -> CommandResult {
    Ok(serde_json::Value::Bool(db.exists(id)?))
}

fn describe_written(db: &Database, stored: &Document) -> CommandResult {
    let id = stored.id().map_err(arbordb_core::CoreError::from)?;
    Ok(serde_json::to_value(db.describe(id)?)?)
}

/// Builds the document to write from `--body` and `key=value` fields.
///
/// Fields are applied over the body; the id always comes from `id`.
pub fn build_document(
    id: &str,
    fields: &[String],
    body: Option<&str>,
) -> Result<Document, CommandError> {
    let mut document = match body {
        Some(body) => Document::from_json_slice(body.as_bytes())
            .map_err(|err| CommandError::InvalidBody(err.to_string()))?,
        None => Document::empty(),
    };

    for field in fields {
        let (key, value) = parse_field(field)?;
        document.insert(key, value);
    }
    document.set_id(id);

    debug!(id = %id, fields = document.len(), "document built");
    Ok(document)
}

/// Splits `key=value`, reading the value as JSON when it parses.
pub fn parse_field(field: &str) -> Result<(String, Value), CommandError> {
    let (key, raw) = field
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CommandError::MalformedField(field.to_string()))?;
    if key == ID_FIELD {
        return Err(CommandError::ReservedField);
    }

    let value =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::Text(raw.to_string()));
    Ok((key.to_string(), value))
}
