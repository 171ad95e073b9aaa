//! Settings file management

use serde::{Deserialize, Serialize};

use crate::errors::UpgradeError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::models::request::DEFAULT_MAX_WAIT_MINUTES;

/// Upgrader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Delay between state polls in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum targets upgraded concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Upper bound on waiting for a terminal state, in minutes
    #[serde(default = "default_max_wait_minutes")]
    pub max_wait_minutes: u64,
}

fn default_http_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1
}

fn default_max_concurrency() -> usize {
    20
}

fn default_max_wait_minutes() -> u64 {
    DEFAULT_MAX_WAIT_MINUTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            http_timeout_secs: default_http_timeout(),
            poll_interval_secs: default_poll_interval(),
            max_concurrency: default_max_concurrency(),
            max_wait_minutes: default_max_wait_minutes(),
        }
    }
}

impl Settings {
    /// Load settings from `file`, or defaults when no file is given
    pub async fn load(file: Option<&File>) -> Result<Self, UpgradeError> {
        match file {
            Some(file) => file.read_json::<Settings>().await,
            None => Ok(Settings::default()),
        }
    }
}
