//! Exclusive lock wait behavior.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_retry_delay_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockConfig {
    /// Give up waiting for the exclusive lock after this many seconds.
    /// Unset means wait until the holder releases it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timeout_secs: Option<u64>,

    /// Delay between acquisition attempts while another process holds the lock.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: None,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl LockConfig {
    #[must_use]
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
