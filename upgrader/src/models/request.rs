//! Deployment request model

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::errors::UpgradeError;

/// Separator between endpoints in a multi-target URL
pub const ENDPOINT_DELIMITER: char = '|';

/// Default upper bound for waiting on a terminal state
pub const DEFAULT_MAX_WAIT_MINUTES: u64 = 10;

/// Top-level action requested against a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Upgrade,
    FinishUpgrade,
    Rollback,
}

impl Action {
    /// Value sent in the `action` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Upgrade => "upgrade",
            Action::FinishUpgrade => "finishupgrade",
            Action::Rollback => "rollback",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UpgradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "upgrade" => Ok(Action::Upgrade),
            "finishupgrade" => Ok(Action::FinishUpgrade),
            "rollback" => Ok(Action::Rollback),
            other => Err(UpgradeError::Config(format!(
                "Invalid action '{}', try use upgrade, finishupgrade or rollback",
                other
            ))),
        }
    }
}

/// HTTP basic credentials, both parts optional
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<SecretString>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.password.is_none()
    }
}

/// Configuration for one orchestration run. Immutable once built; variants
/// are produced with [`DeploymentRequest::derive`].
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    target_endpoint: String,
    action: Action,
    credentials: Credentials,
    new_image: Option<String>,
    new_tag: Option<String>,
    update_environment: bool,
    environment_overrides: Vec<String>,
    force_finish: bool,
    wait: bool,
    max_wait: Duration,
}

impl DeploymentRequest {
    pub fn builder(
        target_endpoint: impl Into<String>,
        action: impl Into<String>,
    ) -> DeploymentRequestBuilder {
        DeploymentRequestBuilder::new(target_endpoint, action)
    }

    pub fn target_endpoint(&self) -> &str {
        &self.target_endpoint
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn new_image(&self) -> Option<&str> {
        self.new_image.as_deref()
    }

    pub fn new_tag(&self) -> Option<&str> {
        self.new_tag.as_deref()
    }

    pub fn update_environment(&self) -> bool {
        self.update_environment
    }

    pub fn environment_overrides(&self) -> &[String] {
        &self.environment_overrides
    }

    pub fn force_finish(&self) -> bool {
        self.force_finish
    }

    pub fn wait(&self) -> bool {
        self.wait
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Individual endpoints named by the target URL, in input order
    pub fn endpoints(&self) -> Vec<&str> {
        split_endpoints(&self.target_endpoint)
    }

    pub fn is_multi_target(&self) -> bool {
        self.endpoints().len() > 1
    }

    /// New request with the given fields replaced; the receiver is untouched.
    pub fn derive(&self, overrides: RequestOverrides) -> DeploymentRequest {
        let mut derived = self.clone();
        if let Some(target_endpoint) = overrides.target_endpoint {
            derived.target_endpoint = target_endpoint;
        }
        if let Some(action) = overrides.action {
            derived.action = action;
        }
        if let Some(wait) = overrides.wait {
            derived.wait = wait;
        }
        derived
    }
}

/// Fields that may differ between a request and one derived from it
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub target_endpoint: Option<String>,
    pub action: Option<Action>,
    pub wait: Option<bool>,
}

impl RequestOverrides {
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            target_endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Same target, different action, always waiting
    pub fn waited_action(action: Action) -> Self {
        Self {
            action: Some(action),
            wait: Some(true),
            ..Default::default()
        }
    }
}

/// Builder that validates a [`DeploymentRequest`]
#[derive(Debug, Clone)]
pub struct DeploymentRequestBuilder {
    target_endpoint: String,
    action: String,
    credentials: Credentials,
    new_image: Option<String>,
    new_tag: Option<String>,
    update_environment: bool,
    environment_overrides: Vec<String>,
    force_finish: bool,
    wait: bool,
    /// `None` when the requested minutes do not fit in seconds
    max_wait: Option<Duration>,
}

impl DeploymentRequestBuilder {
    pub fn new(target_endpoint: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            target_endpoint: target_endpoint.into(),
            action: action.into(),
            credentials: Credentials::default(),
            new_image: None,
            new_tag: None,
            update_environment: false,
            environment_overrides: Vec::new(),
            force_finish: false,
            wait: false,
            max_wait: Some(Duration::from_secs(DEFAULT_MAX_WAIT_MINUTES * 60)),
        }
    }

    pub fn user(mut self, user: Option<String>) -> Self {
        self.credentials.user = user;
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        self.credentials.password = password.map(SecretString::from);
        self
    }

    pub fn image(mut self, image: Option<String>) -> Self {
        self.new_image = image;
        self
    }

    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.new_tag = tag;
        self
    }

    pub fn update_environment(mut self, update: bool) -> Self {
        self.update_environment = update;
        self
    }

    pub fn environment<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environment_overrides = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn force_finish(mut self, force: bool) -> Self {
        self.force_finish = force;
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn max_wait_minutes(mut self, minutes: u64) -> Self {
        self.max_wait = minutes.checked_mul(60).map(Duration::from_secs);
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn build(self) -> Result<DeploymentRequest, UpgradeError> {
        if split_endpoints(&self.target_endpoint).is_empty() {
            return Err(UpgradeError::Config("'url' is required".to_string()));
        }
        let action = self.action.parse::<Action>()?;
        let max_wait = self
            .max_wait
            .ok_or_else(|| UpgradeError::Config("max wait too large".to_string()))?;
        if max_wait.is_zero() {
            return Err(UpgradeError::Config(
                "max wait must be at least one minute".to_string(),
            ));
        }

        Ok(DeploymentRequest {
            target_endpoint: self.target_endpoint.trim().to_string(),
            action,
            credentials: self.credentials,
            new_image: self.new_image,
            new_tag: self.new_tag,
            update_environment: self.update_environment,
            environment_overrides: self.environment_overrides,
            force_finish: self.force_finish,
            wait: self.wait,
            max_wait,
        })
    }
}

fn split_endpoints(target: &str) -> Vec<&str> {
    target
        .split(ENDPOINT_DELIMITER)
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .collect()
}
