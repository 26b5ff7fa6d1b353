//! Parsing of the `old_data` snapshot captured when a mutation is logged.

use serde_json::{Map, Value};
use thiserror::Error;

/// Pre-mutation field values, keyed by column name.
pub type Snapshot = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The audit row carries no `old_data`.
    #[error("no old data available for undo")]
    Missing,

    /// `old_data` is not valid JSON.
    #[error("failed to parse old data: {0}")]
    Invalid(String),

    /// `old_data` is valid JSON but not an object.
    #[error("old data must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parse an `old_data` column. NULL and empty text both count as missing.
///
/// # Errors
///
/// Returns `SnapshotError` if the snapshot is missing, unparseable, or not
/// a JSON object.
pub fn parse_snapshot(old_data: Option<&str>) -> Result<Snapshot, SnapshotError> {
    let raw = match old_data {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(SnapshotError::Missing),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SnapshotError::NotAnObject(json_kind(&other))),
        Err(e) => Err(SnapshotError::Invalid(e.to_string())),
    }
}

/// Read a string-valued field. Non-string values are treated as absent.
#[must_use]
pub fn text_field<'a>(snapshot: &'a Snapshot, key: &str) -> Option<&'a str> {
    snapshot.get(key).and_then(Value::as_str)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
