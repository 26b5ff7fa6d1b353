//! Audit log repository.
//!
//! Append-only entries recording each structural mutation with its
//! pre-mutation snapshot. Rows are removed only when undone.

use dt_core::entities::{AuditLogEntry, NewAuditEntry};
use dt_core::responses::UndoHistory;

use crate::DevDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};

const ENTRY_COLUMNS: &str =
    "id, action, entity_type, entity_id, old_data, changes, commit_sha, agent, created_at";

impl DevDb {
    /// Append an audit entry and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit_entry(&self, entry: &NewAuditEntry) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO audit_log (action, entity_type, entity_id, old_data, changes, commit_sha, agent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    entry.action.as_str(),
                    entry.entity_type.as_str(),
                    entry.entity_id.as_str(),
                    entry.old_data.as_deref(),
                    entry.changes.as_deref(),
                    entry.commit_sha.as_deref(),
                    entry.agent.as_deref()
                ],
            )
            .await?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The entry with the highest id, or `None` when the log is empty.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row cannot be decoded.
    pub async fn last_audit_entry(&self) -> Result<Option<AuditLogEntry>, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM audit_log ORDER BY id DESC LIMIT 1");
        let mut rows = self.conn.query(&sql, ()).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Look up a single entry by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row cannot be decoded.
    pub async fn audit_entry(&self, id: i64) -> Result<Option<AuditLogEntry>, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM audit_log WHERE id = ?1");
        let mut rows = self.conn.query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Up to `limit` entries, newest first.
    ///
    /// Rows that cannot be decoded are logged, counted in `skipped`, and left
    /// out rather than failing the listing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query itself fails.
    pub async fn recent_audit_entries(&self, limit: u32) -> Result<UndoHistory, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM audit_log ORDER BY id DESC LIMIT ?1");
        let rows = self.conn.query(&sql, [i64::from(limit)]).await?;
        collect_history(rows).await
    }

    /// Up to `limit` entries whose `entity_id` is one of `entity_ids`,
    /// newest first. Undecodable rows are handled as in
    /// [`recent_audit_entries`](Self::recent_audit_entries).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query itself fails.
    pub async fn audit_entries_for(
        &self,
        entity_ids: &[String],
        limit: u32,
    ) -> Result<UndoHistory, DatabaseError> {
        if entity_ids.is_empty() {
            return Ok(UndoHistory::default());
        }

        let placeholders = (2..entity_ids.len() + 2)
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM audit_log WHERE entity_id IN ({placeholders}) \
             ORDER BY id DESC LIMIT ?1"
        );

        let mut params: Vec<libsql::Value> = vec![i64::from(limit).into()];
        params.extend(entity_ids.iter().map(|id| libsql::Value::from(id.as_str())));
        let rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        collect_history(rows).await
    }

    /// Delete one entry by id, returning the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_audit_entry(&self, id: i64) -> Result<u64, DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM audit_log WHERE id = ?1", [id])
            .await?;
        Ok(removed)
    }

    /// Whether the log holds at least one entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn has_audit_entries(&self) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT EXISTS (SELECT 1 FROM audit_log)", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)? != 0)
    }
}

async fn collect_history(mut rows: libsql::Rows) -> Result<UndoHistory, DatabaseError> {
    let mut history = UndoHistory::default();
    while let Some(row) = rows.next().await? {
        match row_to_entry(&row) {
            Ok(entry) => history.entries.push(entry),
            Err(error) => {
                tracing::warn!(%error, "skipping undecodable audit row");
                history.skipped += 1;
            }
        }
    }
    Ok(history)
}

fn row_to_entry(row: &libsql::Row) -> Result<AuditLogEntry, DatabaseError> {
    Ok(AuditLogEntry {
        id: row.get::<i64>(0)?,
        action: row.get::<String>(1)?,
        entity_type: row.get::<String>(2)?,
        entity_id: row.get::<String>(3)?,
        old_data: get_opt_string(row, 4)?,
        changes: get_opt_string(row, 5)?,
        commit_sha: get_opt_string(row, 6)?,
        agent: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}
