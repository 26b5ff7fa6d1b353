use anyhow::Context;
use dt_config::DevConfig;
use dt_db::DevDb;

/// Resources shared by command handlers for one invocation.
pub struct AppContext {
    pub db: DevDb,
    pub config: DevConfig,
}

impl AppContext {
    /// Open the store named by `config`.
    pub async fn init(config: DevConfig) -> anyhow::Result<Self> {
        let db = DevDb::open(&config.database, &config.lock)
            .await
            .with_context(|| format!("failed to open devtrack store at {}", config.database.path))?;
        tracing::debug!(path = %config.database.path, "store opened");
        Ok(Self { db, config })
    }
}
