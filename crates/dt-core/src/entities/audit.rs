use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityType};

/// One row of the append-only `audit_log` table.
///
/// `action` and `entity_type` stay raw strings: the log may hold tags this
/// build has no inverse for, and history must still list them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub old_data: Option<String>,
    pub changes: Option<String>,
    pub commit_sha: Option<String>,
    pub agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// The undoable action this row records, if any.
    #[must_use]
    pub fn undo_action(&self) -> Option<AuditAction> {
        AuditAction::from_tag(&self.action)
    }

    #[must_use]
    pub fn target_type(&self) -> Option<EntityType> {
        EntityType::from_tag(&self.entity_type)
    }
}

/// Fields supplied by a mutation command when it appends to the log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl NewAuditEntry {
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    /// Attach a JSON snapshot of the pre-mutation fields.
    #[must_use]
    pub fn with_old_data(mut self, old_data: &serde_json::Value) -> Self {
        self.old_data = Some(old_data.to_string());
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}
