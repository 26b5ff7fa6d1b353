//! Undo manager: reverses the single most recent logged mutation.
//!
//! Reads the newest audit entry, dispatches its action to a compensating
//! write, and removes the entry once the write commits. History beyond the
//! newest entry is read-only.

pub mod error;
pub mod inverse;

use dt_core::entities::AuditLogEntry;
use dt_core::enums::{EntityType, is_creation_tag};
use dt_core::responses::{UndoHistory, UndoResult};

use crate::DevDb;
use crate::error::DatabaseError;
use crate::helpers::{entity_key_predicate, entity_table};

pub use error::UndoError;

/// Borrows the store for the duration of one command.
pub struct UndoManager<'a> {
    db: &'a DevDb,
}

impl<'a> UndoManager<'a> {
    #[must_use]
    pub const fn new(db: &'a DevDb) -> Self {
        Self { db }
    }

    /// Undo the newest audit entry.
    ///
    /// The entry is deleted after the compensating write commits. A failed
    /// deletion is logged and does not fail the undo.
    ///
    /// # Errors
    ///
    /// Returns `UndoError::NothingToUndo` on an empty log,
    /// `UnsupportedAction` for tags without an inverse (entry kept), and any
    /// error from [`UndoManager::revert`].
    pub async fn undo(&self) -> Result<UndoResult, UndoError> {
        let entry = self
            .db
            .last_audit_entry()
            .await?
            .ok_or(UndoError::NothingToUndo)?;

        tracing::debug!(
            id = entry.id,
            action = %entry.action,
            entity_id = %entry.entity_id,
            "undoing newest audit entry"
        );

        let result = self.revert(&entry).await?;

        if let Err(error) = self.db.delete_audit_entry(entry.id).await {
            tracing::warn!(id = entry.id, %error, "undo applied but audit entry was not removed");
        }

        tracing::info!(
            action = %result.action,
            entity_type = %result.entity_type,
            entity_id = %result.entity_id,
            "undo complete"
        );
        Ok(result)
    }

    /// Apply the inverse of `entry` without touching the audit log.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedAction`, `MalformedSnapshot`, `EntityNotFound`,
    /// `SchemaMissing`, or `LockOrTransaction`. The store is unchanged on error.
    pub async fn revert(&self, entry: &AuditLogEntry) -> Result<UndoResult, UndoError> {
        let action = entry
            .undo_action()
            .ok_or_else(|| UndoError::UnsupportedAction(entry.action.clone()))?;

        let plan = inverse::plan(action, entry)?;
        inverse::execute(self.db, &plan).await?;

        Ok(UndoResult {
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            restored: plan.restored,
        })
    }

    /// Whether there is at least one entry to undo.
    ///
    /// # Errors
    ///
    /// Returns `UndoError::Store` if the log cannot be read.
    pub async fn can_undo(&self) -> Result<bool, UndoError> {
        Ok(self.db.has_audit_entries().await?)
    }

    /// Up to `limit` entries, newest first, with a count of skipped rows.
    ///
    /// # Errors
    ///
    /// Returns `UndoError::Store` if the log cannot be read.
    pub async fn undo_history(&self, limit: u32) -> Result<UndoHistory, UndoError> {
        Ok(self.db.recent_audit_entries(limit).await?)
    }

    /// History restricted to entries targeting one of `entity_ids`.
    ///
    /// # Errors
    ///
    /// Returns `UndoError::Store` if the log cannot be read.
    pub async fn entity_history(
        &self,
        entity_ids: &[String],
        limit: u32,
    ) -> Result<UndoHistory, UndoError> {
        Ok(self.db.audit_entries_for(entity_ids, limit).await?)
    }

    /// Check that the target of `entry` still exists.
    ///
    /// Creation actions skip the row check. Entries for entity types this
    /// build does not know pass unchecked.
    ///
    /// # Errors
    ///
    /// Returns `UndoError::EntityNotFound` or `SchemaMissing` when the target
    /// is gone, or `Store` if the lookup fails.
    pub async fn validate_undo_safe(&self, entry: &AuditLogEntry) -> Result<(), UndoError> {
        let Some(entity) = entry.target_type() else {
            return Ok(());
        };

        let table = entity_table(entity);
        if entity == EntityType::Feature && !self.db.table_exists(table).await? {
            return Err(UndoError::SchemaMissing { table });
        }

        if is_creation_tag(&entry.action) {
            return Ok(());
        }

        if self.target_exists(entity, &entry.entity_id).await? {
            Ok(())
        } else {
            Err(UndoError::EntityNotFound {
                entity_type: entity,
                entity_id: entry.entity_id.clone(),
            })
        }
    }

    async fn target_exists(
        &self,
        entity: EntityType,
        entity_id: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            entity_table(entity),
            entity_key_predicate(entity, 1)
        );
        let mut rows = self.db.conn().query(&sql, [entity_id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)? > 0)
    }
}
