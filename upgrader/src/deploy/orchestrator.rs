//! Upgrade, finish-upgrade and rollback actions

use std::sync::Arc;

use service_api::models::state;
use service_api::{ServiceSnapshot, UpgradeRequest};
use tracing::{debug, info};

use crate::app::options::RunOptions;
use crate::deploy::image;
use crate::errors::UpgradeError;
use crate::http::service::ServiceApi;
use crate::models::request::{Action, DeploymentRequest, RequestOverrides};

/// Runs one action against one target
pub struct Orchestrator {
    pub(crate) api: Arc<dyn ServiceApi>,
    pub(crate) options: RunOptions,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ServiceApi>, options: RunOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run the request's action against its single target
    pub async fn execute(
        &self,
        request: &DeploymentRequest,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        if request.is_multi_target() {
            return Err(UpgradeError::Config(format!(
                "'{}' names several endpoints, run it through fan-out",
                request.target_endpoint()
            )));
        }

        match request.action() {
            Action::Upgrade => self.upgrade(request).await,
            Action::FinishUpgrade => self.finish_upgrade(request).await,
            Action::Rollback => self.rollback(request).await,
        }
    }

    async fn upgrade(&self, request: &DeploymentRequest) -> Result<ServiceSnapshot, UpgradeError> {
        let current = self.api.fetch_state(request).await?;
        let mut launch_config = current.launch_config().ok_or_else(|| {
            UpgradeError::Payload(format!(
                "{} has no launchConfig",
                request.target_endpoint()
            ))
        })?;
        debug!("Current state: {}", current.state());

        if request.force_finish() && current.state() == state::UPGRADED {
            info!("Force finish...");
            let finish = request.derive(RequestOverrides::waited_action(Action::FinishUpgrade));
            self.finish_upgrade(&finish).await?;
            info!("Finished!");
        }

        image::mutate_launch_config(&mut launch_config, request)?;
        let body = UpgradeRequest::in_service(launch_config);

        let snapshot = self.api.invoke_action(request, Some(&body)).await?;
        info!("Upgrade called!");

        if !request.wait() {
            return Ok(snapshot);
        }
        self.wait_for(request, state::UPGRADED).await
    }

    async fn finish_upgrade(
        &self,
        request: &DeploymentRequest,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let snapshot = self.api.invoke_action(request, None).await?;
        info!("Finish upgrade called!");

        if !request.wait() {
            return Ok(snapshot);
        }
        self.wait_for(request, state::ACTIVE).await
    }

    /// Rollback never compensates, so a wait that misses `active` still
    /// returns the last snapshot.
    pub(crate) async fn rollback(
        &self,
        request: &DeploymentRequest,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let snapshot = self.api.invoke_action(request, None).await?;
        info!("Rollback called!");

        if !request.wait() {
            return Ok(snapshot);
        }
        let report = self.poll_until(request, state::ACTIVE).await?;
        Ok(report.settle_rollback())
    }
}
