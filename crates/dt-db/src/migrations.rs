//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time. All statements use
//! `IF NOT EXISTS` for idempotent re-running.

use crate::DevDb;
use crate::error::DatabaseError;

/// Core schema: phases, decisions, audit_log.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Optional features table.
const MIGRATION_002: &str = include_str!("../migrations/002_features.sql");

impl DevDb {
    /// Run the core migrations.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }

    /// Create the optional `features` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Migration` if the statements fail.
    pub async fn enable_features(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_features: {e}")))?;
        Ok(())
    }
}
