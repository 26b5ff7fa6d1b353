use dt_core::enums::EntityType;
use dt_core::snapshot::SnapshotError;
use thiserror::Error;

use crate::error::DatabaseError;
use crate::lock::LockError;

/// Failures of the undo manager. None leave a partial write behind.
#[derive(Debug, Error)]
pub enum UndoError {
    #[error("nothing to undo")]
    NothingToUndo,

    /// The log entry's action tag has no inverse; the entry is kept.
    #[error("unsupported action type: {0}")]
    UnsupportedAction(String),

    #[error("cannot undo {action}: {source}")]
    MalformedSnapshot {
        action: String,
        #[source]
        source: SnapshotError,
    },

    #[error("{entity_type} not found: {entity_id}")]
    EntityNotFound {
        entity_type: EntityType,
        entity_id: String,
    },

    #[error("{table} table does not exist")]
    SchemaMissing { table: &'static str },

    #[error("lock or transaction failure: {0}")]
    LockOrTransaction(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl UndoError {
    /// Stable machine-readable code for the error envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NothingToUndo => "nothing_to_undo",
            Self::UnsupportedAction(_) => "unsupported_action",
            Self::MalformedSnapshot { .. } => "malformed_snapshot",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::SchemaMissing { .. } => "schema_missing",
            Self::LockOrTransaction(_) => "lock_or_transaction",
            Self::Store(_) => "store",
        }
    }
}

impl From<LockError> for UndoError {
    fn from(error: LockError) -> Self {
        Self::LockOrTransaction(error.to_string())
    }
}
