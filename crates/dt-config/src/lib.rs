//! # dt-config
//!
//! Layered configuration loading for devtrack using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DEVTRACK_*` prefix, `__` as separator)
//! 2. Project-level `devtrack.toml` in the working directory
//! 3. User-level `~/.config/devtrack/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! `DEVTRACK_DATABASE__PATH` -> `database.path`,
//! `DEVTRACK_LOCK__WAIT_TIMEOUT_SECS` -> `lock.wait_timeout_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use dt_config::DevConfig;
//!
//! let config = DevConfig::load_with_dotenv().expect("config");
//! println!("store: {}", config.database.path);
//! ```

mod database;
mod error;
mod general;
mod lock;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use lock::LockConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file name, resolved against the working directory.
pub const PROJECT_CONFIG_FILE: &str = "devtrack.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DevConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DevConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a provider fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the working directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a provider fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("DEVTRACK_").split("__"))
    }

    /// Reject values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.lock.retry_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lock.retry_delay_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.general.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.history_limit".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("devtrack").join("config.toml"))
    }
}
