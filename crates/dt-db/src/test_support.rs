//! Shared test utilities for dt-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use dt_core::entities::NewAuditEntry;

    use crate::DevDb;

    /// In-memory store with the optional features table created.
    pub async fn test_db() -> DevDb {
        let db = DevDb::open_local(":memory:").await.unwrap();
        db.enable_features().await.unwrap();
        db
    }

    pub async fn seed_phase(db: &DevDb, path: &str, status: &str) -> i64 {
        db.conn()
            .execute(
                "INSERT INTO phases (path, name, category, status, completed_date, description, test_count)
                 VALUES (?1, ?1, 'core', ?2, '2026-02-01', 'done', 12)",
                libsql::params![path, status],
            )
            .await
            .unwrap();
        db.conn().last_insert_rowid()
    }

    pub async fn seed_decision(db: &DevDb, id: &str, status: &str, title: &str) {
        db.conn()
            .execute(
                "INSERT INTO decisions (id, component, title, decision, rationale, date, status)
                 VALUES (?1, 'core', ?3, 'use libsql', 'embedded', '2026-02-01', ?2)",
                libsql::params![id, status, title],
            )
            .await
            .unwrap();
    }

    pub async fn seed_feature(db: &DevDb, name: &str, status: &str) -> i64 {
        db.conn()
            .execute(
                "INSERT INTO features (name, display_name, version, status, description)
                 VALUES (?1, ?1, '0.1.0', ?2, 'initial')",
                libsql::params![name, status],
            )
            .await
            .unwrap();
        db.conn().last_insert_rowid()
    }

    pub async fn log(
        db: &DevDb,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        old_data: Option<&str>,
    ) -> i64 {
        let mut entry = NewAuditEntry::new(action, entity_type, entity_id);
        entry.old_data = old_data.map(str::to_string);
        db.append_audit_entry(&entry).await.unwrap()
    }

    pub async fn text_column(db: &DevDb, sql: &str, key: &str) -> Option<String> {
        let mut rows = db.conn().query(sql, [key]).await.unwrap();
        let row = rows.next().await.unwrap()?;
        row.get::<Option<String>>(0).unwrap()
    }

    pub async fn count(db: &DevDb, sql: &str) -> i64 {
        let mut rows = db.conn().query(sql, ()).await.unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}
