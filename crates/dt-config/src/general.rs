//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default number of entries shown by `dtk history`.
const fn default_history_limit() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for `dtk history`.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}
