//! Per-target outcomes of a run

use serde::Serialize;

/// Result of running one action against one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutResult {
    pub endpoint: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FanOutResult {
    pub fn success(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(endpoint: impl Into<String>, error: impl ToString) -> Self {
        Self {
            endpoint: endpoint.into(),
            succeeded: false,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate of every target in a run, in endpoint order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<FanOutResult>,
}

impl RunReport {
    pub fn new(results: Vec<FanOutResult>) -> Self {
        Self { results }
    }

    /// True iff every target succeeded
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FanOutResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}
