//! Row parsing and schema helpers.
//!
//! Audit rows are written by several tools, so timestamps arrive both as
//! `SQLite`'s `datetime('now')` output and as RFC 3339.

use chrono::{DateTime, Utc};
use dt_core::enums::EntityType;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Probe `sqlite_master` for a table. Works on a transaction as well as a
/// plain connection.
///
/// # Errors
///
/// Returns `DatabaseError` if the schema query fails.
pub async fn table_exists(conn: &libsql::Connection, name: &str) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)? > 0)
}

/// Map `EntityType` to the table holding its rows.
#[must_use]
pub const fn entity_table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Phase => "phases",
        EntityType::Decision => "decisions",
        EntityType::Feature => "features",
    }
}

/// Columns an audit `entity_id` may match, primary key first.
///
/// Phases are logged by path or numeric id; features by numeric id or name.
#[must_use]
pub const fn entity_key_columns(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Phase => &["path", "CAST(id AS TEXT)"],
        EntityType::Decision => &["id"],
        EntityType::Feature => &["CAST(id AS TEXT)", "name"],
    }
}

/// `WHERE` predicate matching `entity_id` bound at parameter `?{param}`.
///
/// With several key columns the predicate resolves to at most one row,
/// preferring a match on the first column.
#[must_use]
pub fn entity_key_predicate(entity: EntityType, param: usize) -> String {
    let columns = entity_key_columns(entity);
    let [first, ..] = columns else {
        return String::from("0");
    };
    if columns.len() == 1 {
        return format!("{first} = ?{param}");
    }

    let any = columns
        .iter()
        .map(|column| format!("{column} = ?{param}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!(
        "id = (SELECT id FROM {table} WHERE {any} \
         ORDER BY CASE WHEN {first} = ?{param} THEN 0 ELSE 1 END LIMIT 1)",
        table = entity_table(entity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_both_datetime_formats() {
        let sqlite = parse_datetime("2026-02-09 14:30:00").unwrap();
        let rfc = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        assert_eq!(sqlite, rfc);
    }

    #[test]
    fn rejects_garbage_datetime() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[rstest]
    #[case(
        EntityType::Phase,
        1,
        "id = (SELECT id FROM phases WHERE path = ?1 OR CAST(id AS TEXT) = ?1 \
         ORDER BY CASE WHEN path = ?1 THEN 0 ELSE 1 END LIMIT 1)"
    )]
    #[case(EntityType::Decision, 3, "id = ?3")]
    #[case(
        EntityType::Feature,
        2,
        "id = (SELECT id FROM features WHERE CAST(id AS TEXT) = ?2 OR name = ?2 \
         ORDER BY CASE WHEN CAST(id AS TEXT) = ?2 THEN 0 ELSE 1 END LIMIT 1)"
    )]
    fn key_predicates(#[case] entity: EntityType, #[case] param: usize, #[case] expected: &str) {
        assert_eq!(entity_key_predicate(entity, param), expected);
    }

    #[tokio::test]
    async fn table_exists_probe() {
        let db = crate::DevDb::open_local(":memory:").await.unwrap();
        assert!(table_exists(db.conn(), "audit_log").await.unwrap());
        assert!(!table_exists(db.conn(), "categories").await.unwrap());
    }
}
