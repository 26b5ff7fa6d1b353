//! # dt-db
//!
//! libSQL store for devtrack: schema bootstrap, the append-only audit log,
//! the cross-process exclusive lock, and the undo manager that reverses the
//! most recent logged mutation.

pub mod error;
pub mod helpers;
pub mod lock;
mod migrations;
pub mod repos;
pub mod undo;

#[cfg(test)]
mod test_support;

use dt_config::{DatabaseConfig, LockConfig};
use error::DatabaseError;
use libsql::Builder;
use lock::{ExclusiveLock, LockSettings};

const IN_MEMORY: &str = ":memory:";

/// Handle to the devtrack store.
///
/// Owned by the command that opened it and dropped when the command ends.
/// Every component that needs the store borrows this handle explicitly.
pub struct DevDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    lock: ExclusiveLock,
}

impl DevDb {
    /// Open a local database at the given path with default lock settings.
    ///
    /// Runs migrations automatically on open. File-backed stores lock
    /// `<path>.lock`; `:memory:` stores only serialize within the process.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_with(path, LockSettings::default()).await
    }

    /// Open the store described by the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(database: &DatabaseConfig, lock: &LockConfig) -> Result<Self, DatabaseError> {
        tracing::debug!(
            path = %database.path,
            in_memory = database.is_in_memory(),
            features = database.features,
            "opening store"
        );
        let dev_db = Self::open_with(&database.path, LockSettings::from(lock)).await?;
        if database.features {
            dev_db.enable_features().await?;
        }
        Ok(dev_db)
    }

    /// Open a local database with explicit lock settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_with(path: &str, settings: LockSettings) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let lock = if path == IN_MEMORY {
            ExclusiveLock::in_process(settings)
        } else {
            ExclusiveLock::at_path(format!("{path}.lock"), settings)
        };

        let dev_db = Self { db, conn, lock };
        dev_db.run_migrations().await?;
        Ok(dev_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// The exclusive lock guarding compensating writes.
    #[must_use]
    pub const fn lock(&self) -> &ExclusiveLock {
        &self.lock
    }

    /// Whether a table exists in the schema.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the schema query fails.
    pub async fn table_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        helpers::table_exists(&self.conn, name).await
    }
}
