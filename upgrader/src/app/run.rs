//! Top-level run

use std::sync::Arc;

use colored::Colorize;
use tracing::info;

use crate::app::options::RunOptions;
use crate::deploy::fanout;
use crate::deploy::orchestrator::Orchestrator;
use crate::errors::UpgradeError;
use crate::http::client::HttpClient;
use crate::http::service::ServiceApi;
use crate::models::outcome::RunReport;
use crate::models::request::DeploymentRequest;

/// Run a validated request against the live API
pub async fn run(request: &DeploymentRequest, options: RunOptions) -> Result<RunReport, UpgradeError> {
    let api: Arc<dyn ServiceApi> = Arc::new(HttpClient::new(options.http_timeout)?);
    Ok(run_with(api, request, options).await)
}

/// Run a validated request against any [`ServiceApi`]
pub async fn run_with(
    api: Arc<dyn ServiceApi>,
    request: &DeploymentRequest,
    options: RunOptions,
) -> RunReport {
    info!(
        "Executing {} (wait={}, force={})",
        request.action(),
        request.wait(),
        request.force_finish()
    );
    let orchestrator = Arc::new(Orchestrator::new(api, options));
    fanout::run(orchestrator, request).await
}

/// One line per target, for the terminal
pub fn summary_lines(report: &RunReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|result| match &result.error {
            None => format!(" {} {}", "OK".green().bold(), result.endpoint),
            Some(error) => format!(" {} {} - {}", "FAILED".red().bold(), result.endpoint, error),
        })
        .collect()
}
