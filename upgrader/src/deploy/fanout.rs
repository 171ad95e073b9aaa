//! Multi-target execution
//!
//! A target URL naming several endpoints is split into one request per
//! endpoint. Every endpoint is attempted regardless of earlier failures;
//! concurrency is bounded by a semaphore.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::deploy::orchestrator::Orchestrator;
use crate::models::outcome::{FanOutResult, RunReport};
use crate::models::request::{DeploymentRequest, RequestOverrides};

/// Run the request against every endpoint it names
pub async fn run(orchestrator: Arc<Orchestrator>, request: &DeploymentRequest) -> RunReport {
    let endpoints: Vec<String> = request.endpoints().into_iter().map(str::to_string).collect();

    if let [endpoint] = endpoints.as_slice() {
        let target = request.derive(RequestOverrides::endpoint(endpoint.as_str()));
        return RunReport::new(vec![run_target(&orchestrator, &target).await]);
    }

    let max_concurrency = orchestrator.options().max_concurrency.max(1);
    info!(
        "Running {} on {} targets ({} at a time)",
        request.action(),
        endpoints.len(),
        max_concurrency
    );

    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut handles = Vec::with_capacity(endpoints.len());

    for endpoint in &endpoints {
        let target = request.derive(RequestOverrides::endpoint(endpoint.as_str()));
        let sem = Arc::clone(&semaphore);
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            let _permit = match sem.acquire().await {
                Ok(permit) => permit,
                Err(e) => return FanOutResult::failure(target.target_endpoint(), e),
            };
            run_target(&orchestrator, &target).await
        }));
    }

    let results = join_all(handles)
        .await
        .into_iter()
        .zip(endpoints)
        .map(|(joined, endpoint)| {
            joined.unwrap_or_else(|e| {
                error!("Worker for {} aborted: {}", endpoint, e);
                FanOutResult::failure(endpoint, format!("worker aborted: {}", e))
            })
        })
        .collect::<Vec<_>>();

    let report = RunReport::new(results);
    info!(
        "{} of {} targets succeeded",
        report.results.len() - report.failures().count(),
        report.results.len()
    );
    report
}

async fn run_target(orchestrator: &Orchestrator, target: &DeploymentRequest) -> FanOutResult {
    let span = info_span!(
        "target",
        endpoint = %target.target_endpoint(),
        action = %target.action(),
        run_id = %Uuid::new_v4()
    );

    async {
        match orchestrator.execute(target).await {
            Ok(_) => FanOutResult::success(target.target_endpoint()),
            Err(e) => {
                error!("Failed: {}", e);
                FanOutResult::failure(target.target_endpoint(), e)
            }
        }
    }
    .instrument(span)
    .await
}
