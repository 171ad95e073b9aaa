//! API models
//!
//! Service resources are kept as order-preserving JSON documents. Only the
//! fields the upgrader reads or rewrites get typed accessors; everything else
//! the server sends is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known service states
pub mod state {
    pub const ACTIVE: &str = "active";
    pub const UPGRADED: &str = "upgraded";
    pub const UPGRADING: &str = "upgrading";
    pub const UPGRADE_FAILED: &str = "upgradefailed";
    pub const ROLLING_BACK: &str = "rolling-back";
}

const STATE: &str = "state";
const TRANSITIONING: &str = "transitioning";
const TRANSITIONING_MESSAGE: &str = "transitioningMessage";
const LAUNCH_CONFIG: &str = "launchConfig";
const IMAGE_UUID: &str = "imageUuid";
const ENVIRONMENT: &str = "environment";

/// Point-in-time view of a service resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceSnapshot(Value);

impl ServiceSnapshot {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// An empty document, used for bodiless responses
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Current state, or an empty string when the server did not report one
    pub fn state(&self) -> &str {
        self.0.get(STATE).and_then(Value::as_str).unwrap_or_default()
    }

    /// Whether the service is mid-change. Only the literal `"yes"` counts.
    pub fn is_transitioning(&self) -> bool {
        self.0.get(TRANSITIONING).and_then(Value::as_str) == Some("yes")
    }

    pub fn transitioning_message(&self) -> Option<&str> {
        self.0
            .get(TRANSITIONING_MESSAGE)
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
    }

    /// Copy of the launch configuration, if the resource carries one
    pub fn launch_config(&self) -> Option<LaunchConfig> {
        match self.0.get(LAUNCH_CONFIG) {
            Some(Value::Object(map)) => Some(LaunchConfig(map.clone())),
            _ => None,
        }
    }
}

/// Deployable unit specification held by the remote service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchConfig(Map<String, Value>);

impl LaunchConfig {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Image reference in `repo[:tag]` form
    pub fn image_reference(&self) -> Option<&str> {
        self.0.get(IMAGE_UUID).and_then(Value::as_str)
    }

    pub fn set_image_reference(&mut self, reference: impl Into<String>) {
        self.0
            .insert(IMAGE_UUID.to_string(), Value::String(reference.into()));
    }

    pub fn environment(&self) -> Option<&Map<String, Value>> {
        self.0.get(ENVIRONMENT).and_then(Value::as_object)
    }

    /// Replace the whole environment mapping
    pub fn replace_environment<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let environment: Map<String, Value> = vars
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        self.0
            .insert(ENVIRONMENT.to_string(), Value::Object(environment));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Body of an `upgrade` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub in_service_strategy: InServiceStrategy,
}

impl UpgradeRequest {
    pub fn in_service(launch_config: LaunchConfig) -> Self {
        Self {
            in_service_strategy: InServiceStrategy::new(launch_config),
        }
    }
}

/// Incremental rollout policy sent alongside a new launch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InServiceStrategy {
    pub batch_size: u32,
    pub interval_millis: u64,
    pub start_first: bool,
    pub launch_config: LaunchConfig,
}

impl InServiceStrategy {
    pub const BATCH_SIZE: u32 = 1;
    pub const INTERVAL_MILLIS: u64 = 2000;
    pub const START_FIRST: bool = true;

    pub fn new(launch_config: LaunchConfig) -> Self {
        Self {
            batch_size: Self::BATCH_SIZE,
            interval_millis: Self::INTERVAL_MILLIS,
            start_first: Self::START_FIRST,
            launch_config,
        }
    }
}

/// Error document returned by the API on failed calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}
