//! Compensating writes for each undoable action.
//!
//! [`plan`] turns an audit entry into a single parameterized statement;
//! [`execute`] runs it under the exclusive lock inside a transaction.

use dt_core::entities::AuditLogEntry;
use dt_core::enums::{AuditAction, EntityType};
use dt_core::snapshot::{Snapshot, SnapshotError, parse_snapshot, text_field};

use super::error::UndoError;
use crate::DevDb;
use crate::helpers::{entity_key_predicate, entity_table, table_exists};

/// Decision fields a sparse restore may write back.
const DECISION_RESTORE_FIELDS: &[&str] = &["status", "title", "rationale"];
/// Feature fields a sparse restore may write back.
const FEATURE_RESTORE_FIELDS: &[&str] = &["status", "description"];

/// A compensating write ready to run.
#[derive(Debug, Clone)]
pub struct InversePlan {
    pub action: AuditAction,
    pub entity: EntityType,
    pub entity_id: String,
    pub statement: String,
    pub params: Vec<libsql::Value>,
    /// Optional table that must exist before the statement runs.
    pub requires_table: Option<&'static str>,
    pub restored: Option<Snapshot>,
}

/// Build the inverse of `entry`, recorded as `action`.
///
/// # Errors
///
/// Returns `UndoError::MalformedSnapshot` if the action needs `old_data`
/// and it is missing or not a JSON object.
pub fn plan(action: AuditAction, entry: &AuditLogEntry) -> Result<InversePlan, UndoError> {
    let snapshot = if action.requires_snapshot() {
        Some(
            parse_snapshot(entry.old_data.as_deref()).map_err(|source| {
                UndoError::MalformedSnapshot {
                    action: entry.action.clone(),
                    source,
                }
            })?,
        )
    } else {
        None
    };

    let entity = action.entity_type();
    let (statement, params) = match (action, snapshot.as_ref()) {
        (AuditAction::CompletePhase, _) => phase_reset(&entry.entity_id),
        (AuditAction::CreateDecision, _) => decision_delete(&entry.entity_id),
        (AuditAction::UpdateDecision | AuditAction::UpdateFeature, Some(snapshot)) => {
            let fields = if entity == EntityType::Feature {
                FEATURE_RESTORE_FIELDS
            } else {
                DECISION_RESTORE_FIELDS
            };
            sparse_restore(entity, fields, snapshot, &entry.entity_id)
        }
        (AuditAction::UpdateDecision | AuditAction::UpdateFeature, None) => {
            return Err(UndoError::MalformedSnapshot {
                action: entry.action.clone(),
                source: SnapshotError::Missing,
            });
        }
    };

    Ok(InversePlan {
        action,
        entity,
        entity_id: entry.entity_id.clone(),
        statement,
        params,
        requires_table: (entity == EntityType::Feature).then_some(entity_table(entity)),
        restored: snapshot,
    })
}

/// Phase completions are reversed to a fixed baseline, not to the snapshot.
fn phase_reset(entity_id: &str) -> (String, Vec<libsql::Value>) {
    let sql = format!(
        "UPDATE phases SET status = 'pending', completed_date = NULL, description = NULL, \
         test_count = 0, updated_at = datetime('now') WHERE {}",
        entity_key_predicate(EntityType::Phase, 1)
    );
    (sql, vec![entity_id.into()])
}

fn decision_delete(entity_id: &str) -> (String, Vec<libsql::Value>) {
    let sql = format!(
        "DELETE FROM decisions WHERE {}",
        entity_key_predicate(EntityType::Decision, 1)
    );
    (sql, vec![entity_id.into()])
}

/// Write back only the string-valued snapshot fields listed in `fields`.
fn sparse_restore(
    entity: EntityType,
    fields: &[&str],
    snapshot: &Snapshot,
    entity_id: &str,
) -> (String, Vec<libsql::Value>) {
    let mut sets = vec!["updated_at = datetime('now')".to_string()];
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut idx = 1;

    for field in fields {
        if let Some(value) = text_field(snapshot, field) {
            sets.push(format!("{field} = ?{idx}"));
            params.push(value.into());
            idx += 1;
        }
    }

    params.push(entity_id.into());
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        entity_table(entity),
        sets.join(", "),
        entity_key_predicate(entity, idx)
    );
    (sql, params)
}

/// Run `plan` under the store's exclusive lock and a transaction.
///
/// Any failure rolls the transaction back, leaving the store unchanged.
///
/// # Errors
///
/// Returns `UndoError::LockOrTransaction` if the lock or transaction cannot
/// be obtained or committed, `SchemaMissing` if a required table is absent,
/// and `EntityNotFound` if no row matched.
pub async fn execute(db: &DevDb, plan: &InversePlan) -> Result<(), UndoError> {
    let lock = db.lock();
    tracing::debug!(
        lock_file = ?lock.path(),
        wait_timeout = ?lock.settings().wait_timeout,
        "acquiring exclusive lock"
    );
    let _guard = lock.acquire().await?;

    let tx = db
        .conn()
        .transaction()
        .await
        .map_err(|e| UndoError::LockOrTransaction(format!("failed to begin transaction: {e}")))?;

    match apply(&tx, plan).await {
        Ok(()) => tx
            .commit()
            .await
            .map_err(|e| UndoError::LockOrTransaction(format!("failed to commit: {e}"))),
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(%rollback, "rollback after failed undo also failed");
            }
            Err(error)
        }
    }
}

async fn apply(tx: &libsql::Transaction, plan: &InversePlan) -> Result<(), UndoError> {
    if let Some(table) = plan.requires_table {
        if !table_exists(tx, table).await? {
            return Err(UndoError::SchemaMissing { table });
        }
    }

    let affected = tx
        .execute(&plan.statement, libsql::params_from_iter(plan.params.clone()))
        .await
        .map_err(crate::error::DatabaseError::from)?;

    if affected == 0 {
        return Err(UndoError::EntityNotFound {
            entity_type: plan.entity,
            entity_id: plan.entity_id.clone(),
        });
    }

    tracing::debug!(
        action = plan.action.as_str(),
        entity_id = %plan.entity_id,
        "compensating write applied"
    );
    Ok(())
}
