//! Runtime options

use std::time::Duration;

use crate::storage::settings::Settings;

/// Bound on concurrently running targets during fan-out
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

/// Runtime knobs shared by every target of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Delay before each state poll while waiting
    pub poll_interval: Duration,

    /// Maximum number of targets processed at once
    pub max_concurrency: usize,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            max_concurrency: settings.max_concurrency.max(1),
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
        }
    }
}
