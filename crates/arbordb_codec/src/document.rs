//! Documents: JSON objects with a reserved `id` field.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Name of the reserved identifier field.
pub const ID_FIELD: &str = "id";

/// A JSON object addressed by the slash-separated path in its `id` field.
///
/// A `Document` with no fields at all is treated as uninitialized: asking it
/// for its id fails with [`CodecError::EmptyDocument`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    /// Creates a document holding only the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), Value::Text(id.into()));
        Self(fields)
    }

    /// Creates a document with no fields, not even an id.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns the value for `key`, treating an explicit null as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Returns the value for `key`, or `default` when it is absent or null.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Returns the document's identifier.
    ///
    /// # Errors
    ///
    /// - [`CodecError::EmptyDocument`] if the document has no fields
    /// - [`CodecError::InvalidId`] if `id` is missing or not a string
    pub fn id(&self) -> CodecResult<&str> {
        if self.0.is_empty() {
            return Err(CodecError::EmptyDocument);
        }
        self.get(ID_FIELD)
            .and_then(Value::as_text)
            .ok_or(CodecError::InvalidId)
    }

    /// Overwrites the `id` field.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(ID_FIELD.to_string(), Value::Text(id.into()));
    }

    /// Shallow-merges `other` into this document.
    ///
    /// Keys from `other` overwrite existing keys; keys only present here are
    /// left untouched. Nested maps and arrays are replaced, never merged.
    pub fn patch(&mut self, other: Document) {
        self.0.extend(other.0);
    }

    /// Returns true if the document has a field named `key` (even if null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields, including `id`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Consumes the document, returning its fields.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    /// Encodes the document as compact JSON.
    pub fn to_json_vec(&self) -> CodecResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a document from JSON bytes. The top level must be an object.
    pub fn from_json_slice(bytes: &[u8]) -> CodecResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Converts the document into a `serde_json::Value` object.
    pub fn to_json_value(&self) -> CodecResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Builds a document from a `serde_json::Value`, which must be an object.
    pub fn from_json_value(value: serde_json::Value) -> CodecResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
