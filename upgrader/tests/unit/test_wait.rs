//! Wait engine tests

mod support;

use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use rancher_upgrader::deploy::orchestrator::Orchestrator;
use rancher_upgrader::deploy::wait::WAIT_FAILED_MESSAGE;
use rancher_upgrader::errors::UpgradeError;
use rancher_upgrader::models::request::{Action, DeploymentRequest};
use support::{options, service, Call, ScriptedApi};

const TARGET: &str = "http://rancher/v1/services/1s5";

fn upgrade_request(max_wait: Duration) -> DeploymentRequest {
    DeploymentRequest::builder(TARGET, "upgrade")
        .wait(true)
        .max_wait(max_wait)
        .build()
        .unwrap()
}

fn orchestrator(api: &Arc<ScriptedApi>) -> Orchestrator {
    Orchestrator::new(api.clone(), options())
}

#[tokio::test]
async fn test_wait_reaches_expected_state() {
    let api = Arc::new(ScriptedApi::new().script(
        TARGET,
        vec![
            service("upgrading", true, ""),
            service("upgrading", true, ""),
            service("upgraded", false, ""),
        ],
    ));

    let snapshot = assert_ok!(
        orchestrator(&api)
            .wait_for(&upgrade_request(Duration::from_secs(600)), "upgraded")
            .await
    );

    assert_eq!(snapshot.state(), "upgraded");
    assert_eq!(api.count_fetches(), 3);
    assert_eq!(api.count_actions(Action::Rollback), 0);
}

#[tokio::test]
async fn test_wait_rolls_back_once_when_transition_stops() {
    let api = Arc::new(ScriptedApi::new().script(
        TARGET,
        vec![
            service("upgrading", true, ""),
            service("upgradefailed", false, "Failed to pull image nginx:9"),
            service("rolling-back", true, ""),
            service("active", false, ""),
        ],
    ));

    let err = assert_err!(
        orchestrator(&api)
            .wait_for(&upgrade_request(Duration::from_secs(600)), "upgraded")
            .await
    );

    match err {
        UpgradeError::Timeout(message) => assert_eq!(message, "Failed to pull image nginx:9"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(api.count_actions(Action::Rollback), 1);
    assert_eq!(api.actions(TARGET), vec![Action::Rollback]);
}

#[tokio::test]
async fn test_wait_budget_exhausted_rolls_back_with_generic_message() {
    let api = Arc::new(ScriptedApi::new().script(TARGET, vec![service("upgrading", true, "")]));

    let err = assert_err!(
        orchestrator(&api)
            .wait_for(&upgrade_request(Duration::from_secs(3)), "upgraded")
            .await
    );

    match err {
        UpgradeError::Timeout(message) => assert_eq!(message, WAIT_FAILED_MESSAGE),
        other => panic!("unexpected error: {other}"),
    }

    // Cycles 1 through 4 poll, the fourth exceeds the three second budget.
    let calls = api.calls();
    let rollback_at = calls
        .iter()
        .position(|call| matches!(call, Call::Action(_, Action::Rollback, _)))
        .unwrap();
    assert_eq!(rollback_at, 4);
    assert_eq!(api.count_actions(Action::Rollback), 1);
}

#[tokio::test]
async fn test_wait_stopped_without_message_uses_generic_message() {
    let api = Arc::new(ScriptedApi::new().script(
        TARGET,
        vec![service("upgradefailed", false, "  "), service("active", false, "")],
    ));

    let err = assert_err!(
        orchestrator(&api)
            .wait_for(&upgrade_request(Duration::from_secs(600)), "upgraded")
            .await
    );

    assert_eq!(err.to_string(), format!("Timeout error: {}", WAIT_FAILED_MESSAGE));
    assert_eq!(api.count_actions(Action::Rollback), 1);
}

#[tokio::test]
async fn test_wait_transport_error_is_not_compensated() {
    let api = Arc::new(ScriptedApi::new().fail(TARGET));

    let err = assert_err!(
        orchestrator(&api)
            .wait_for(&upgrade_request(Duration::from_secs(600)), "upgraded")
            .await
    );

    assert!(matches!(err, UpgradeError::Transport { .. }));
    assert_eq!(api.count_actions(Action::Rollback), 0);
}

#[tokio::test]
async fn test_rollback_wait_does_not_compensate() {
    let api = Arc::new(ScriptedApi::new().script(
        TARGET,
        vec![service("upgraded", false, "rollback refused")],
    ));
    let request = DeploymentRequest::builder(TARGET, "rollback")
        .wait(true)
        .build()
        .unwrap();

    let snapshot = assert_ok!(orchestrator(&api).wait_for(&request, "active").await);

    assert_eq!(snapshot.state(), "upgraded");
    assert_eq!(api.count_actions(Action::Rollback), 0);
}
