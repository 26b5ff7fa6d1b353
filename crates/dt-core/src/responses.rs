//! Response types returned by the undo core and rendered by `dtk`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::AuditLogEntry;
use crate::snapshot::Snapshot;

/// Outcome of a successful undo.
///
/// `restored` is the snapshot parsed from the consumed entry. For phase
/// completions the store is reset to a fixed baseline, so `restored` can
/// hold values that were not written back.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UndoResult {
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored: Option<Snapshot>,
}

/// Recent audit entries, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UndoHistory {
    pub entries: Vec<AuditLogEntry>,
    /// Rows that could not be decoded and were left out of `entries`.
    pub skipped: u32,
}

/// Response from `dtk can-undo`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CanUndoResponse {
    pub can_undo: bool,
}

/// One line of `dtk validate` output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub id: i64,
    pub safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn passed(entry: &AuditLogEntry) -> Self {
        Self {
            id: entry.id,
            safe: true,
            action: Some(entry.action.clone()),
            entity_type: Some(entry.entity_type.clone()),
            entity_id: Some(entry.entity_id.clone()),
            err: None,
        }
    }

    #[must_use]
    pub fn failed(id: i64, entry: Option<&AuditLogEntry>, err: impl Into<String>) -> Self {
        Self {
            id,
            safe: false,
            action: entry.map(|e| e.action.clone()),
            entity_type: entry.map(|e| e.entity_type.clone()),
            entity_id: entry.map(|e| e.entity_id.clone()),
            err: Some(err.into()),
        }
    }
}
