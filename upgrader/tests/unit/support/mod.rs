//! Scripted in-memory service API shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use rancher_upgrader::app::options::RunOptions;
use rancher_upgrader::errors::UpgradeError;
use rancher_upgrader::http::service::ServiceApi;
use rancher_upgrader::models::request::{Action, DeploymentRequest};
use service_api::{ServiceSnapshot, UpgradeRequest};

/// A call received by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String),
    Action(String, Action, Option<Value>),
}

/// Serves scripted snapshots per endpoint. The last snapshot of a script
/// repeats once the script runs out.
#[derive(Default)]
pub struct ScriptedApi {
    scripts: Mutex<HashMap<String, VecDeque<ServiceSnapshot>>>,
    calls: Mutex<Vec<Call>>,
    failing: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, endpoint: &str, snapshots: Vec<ServiceSnapshot>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), snapshots.into());
        self
    }

    /// Every call against `endpoint` fails with a transport error
    pub fn fail(mut self, endpoint: &str) -> Self {
        self.failing.insert(endpoint.to_string());
        self
    }

    /// Hold every call for `delay`
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn actions(&self, endpoint: &str) -> Vec<Action> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Action(e, action, _) if e == endpoint => Some(action),
                _ => None,
            })
            .collect()
    }

    pub fn count_actions(&self, action: Action) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Action(_, a, _) if *a == action))
            .count()
    }

    pub fn count_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Fetch(_)))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: Call) -> Result<(), UpgradeError> {
        let endpoint = match &call {
            Call::Fetch(e) | Call::Action(e, _, _) => e.clone(),
        };
        self.calls.lock().unwrap().push(call);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&endpoint) {
            return Err(UpgradeError::Transport {
                url: endpoint,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn next_snapshot(&self, endpoint: &str) -> ServiceSnapshot {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(endpoint) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap_or_default(),
            None => service("active", false, ""),
        }
    }
}

#[async_trait]
impl ServiceApi for ScriptedApi {
    async fn fetch_state(
        &self,
        request: &DeploymentRequest,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let endpoint = request.target_endpoint().to_string();
        self.enter(Call::Fetch(endpoint.clone())).await?;
        Ok(self.next_snapshot(&endpoint))
    }

    async fn invoke_action(
        &self,
        request: &DeploymentRequest,
        body: Option<&UpgradeRequest>,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let body = body.map(|b| serde_json::to_value(b).unwrap());
        self.enter(Call::Action(
            request.target_endpoint().to_string(),
            request.action(),
            body,
        ))
        .await?;
        Ok(ServiceSnapshot::empty())
    }
}

/// Service resource with a launch configuration
pub fn service(state: &str, transitioning: bool, message: &str) -> ServiceSnapshot {
    ServiceSnapshot::new(json!({
        "id": "1s5",
        "type": "service",
        "state": state,
        "transitioning": if transitioning { "yes" } else { "no" },
        "transitioningMessage": message,
        "launchConfig": {
            "imageUuid": "docker:nginx:1.0",
            "environment": { "OLD": "value" },
            "ports": ["80:80/tcp"],
            "labels": { "io.rancher.scheduler.global": "true" }
        }
    }))
}

pub fn options() -> RunOptions {
    RunOptions {
        poll_interval: Duration::ZERO,
        max_concurrency: 20,
        http_timeout: Duration::from_secs(5),
    }
}
