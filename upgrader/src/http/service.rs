//! Remote action API

use async_trait::async_trait;
use service_api::{ServiceSnapshot, UpgradeRequest};

use crate::errors::UpgradeError;
use crate::http::client::HttpClient;
use crate::models::request::DeploymentRequest;

/// Primitive remote calls the orchestrator is built on
#[async_trait]
pub trait ServiceApi: Send + Sync {
    /// Read the current state of the request's target
    async fn fetch_state(&self, request: &DeploymentRequest)
        -> Result<ServiceSnapshot, UpgradeError>;

    /// Invoke the request's action against its target
    async fn invoke_action(
        &self,
        request: &DeploymentRequest,
        body: Option<&UpgradeRequest>,
    ) -> Result<ServiceSnapshot, UpgradeError>;
}

#[async_trait]
impl ServiceApi for HttpClient {
    async fn fetch_state(
        &self,
        request: &DeploymentRequest,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        self.get(request.target_endpoint(), request.credentials())
            .await
    }

    async fn invoke_action(
        &self,
        request: &DeploymentRequest,
        body: Option<&UpgradeRequest>,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        self.post_action(
            request.target_endpoint(),
            request.credentials(),
            request.action(),
            body,
        )
        .await
    }
}
