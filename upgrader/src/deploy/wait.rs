//! Waiting for a service to reach a target state

use service_api::models::state;
use service_api::ServiceSnapshot;
use tracing::{debug, error, info, warn};

use crate::deploy::orchestrator::Orchestrator;
use crate::errors::UpgradeError;
use crate::models::request::{Action, DeploymentRequest, RequestOverrides};

/// Message used when the budget runs out or the server gives no reason
pub const WAIT_FAILED_MESSAGE: &str = "waiting for state failed";

/// How a polling loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Expected state observed
    Reached,
    /// Service stopped transitioning in another state
    Stopped { message: Option<String> },
    /// Cycle budget used up while still transitioning
    Exhausted,
}

/// Last snapshot seen by a polling loop and why it stopped
#[derive(Debug, Clone)]
pub struct WaitReport {
    pub expected: String,
    pub snapshot: ServiceSnapshot,
    pub cycles: u64,
    pub outcome: WaitOutcome,
}

impl WaitReport {
    pub fn reached(&self) -> bool {
        self.outcome == WaitOutcome::Reached
    }

    /// Reason surfaced to the caller when the wait failed
    pub fn failure_message(&self) -> String {
        match &self.outcome {
            WaitOutcome::Stopped {
                message: Some(message),
            } => message.clone(),
            _ => WAIT_FAILED_MESSAGE.to_string(),
        }
    }

    pub(crate) fn settle_rollback(self) -> ServiceSnapshot {
        if !self.reached() {
            warn!(
                "Rollback ended in state '{}' instead of '{}': {}",
                self.snapshot.state(),
                self.expected,
                self.failure_message()
            );
        }
        self.snapshot
    }
}

impl Orchestrator {
    /// Block until the target reports `expected`. On failure the target is
    /// rolled back, unless the request is itself a rollback.
    pub async fn wait_for(
        &self,
        request: &DeploymentRequest,
        expected: &str,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let report = self.poll_until(request, expected).await?;
        if report.reached() {
            return Ok(report.snapshot);
        }
        if request.action() == Action::Rollback {
            return Ok(report.settle_rollback());
        }

        let message = report.failure_message();
        error!(
            "Waiting for '{}' failed after {} polls in state '{}': {}",
            expected,
            report.cycles,
            report.snapshot.state(),
            message
        );
        self.compensate(request).await;
        Err(UpgradeError::Timeout(message))
    }

    /// Poll once per interval while the state differs from `expected`, the
    /// service is transitioning and the budget is not exhausted.
    pub(crate) async fn poll_until(
        &self,
        request: &DeploymentRequest,
        expected: &str,
    ) -> Result<WaitReport, UpgradeError> {
        let budget = request.max_wait().as_secs();
        let mut cycles: u64 = 0;
        info!("Waiting {} state", expected);

        loop {
            tokio::time::sleep(self.options.poll_interval).await;
            cycles += 1;

            let snapshot = self.api.fetch_state(request).await?;
            debug!(
                "Poll {}: state={} transitioning={}",
                cycles,
                snapshot.state(),
                snapshot.is_transitioning()
            );

            let outcome = if snapshot.state() == expected {
                WaitOutcome::Reached
            } else if !snapshot.is_transitioning() {
                WaitOutcome::Stopped {
                    message: snapshot.transitioning_message().map(str::to_string),
                }
            } else if cycles > budget {
                WaitOutcome::Exhausted
            } else {
                continue;
            };

            return Ok(WaitReport {
                expected: expected.to_string(),
                snapshot,
                cycles,
                outcome,
            });
        }
    }

    async fn compensate(&self, request: &DeploymentRequest) {
        warn!("Rolling back {}", request.target_endpoint());
        let rollback = request.derive(RequestOverrides::waited_action(Action::Rollback));

        match self.rollback(&rollback).await {
            Ok(snapshot) if snapshot.state() == state::ACTIVE => {
                info!("Compensating rollback completed");
            }
            Ok(_) => {}
            Err(e) => {
                error!("Compensating rollback failed: {}", e);
            }
        }
    }
}
