//! HTTP client implementation

use std::time::Duration;

use http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Serialize;
use service_api::{ErrorResponse, ServiceSnapshot};
use tracing::{debug, error, warn};
use url::Url;

use crate::errors::UpgradeError;
use crate::models::request::{Action, Credentials};

/// Statuses accepted as success for any call
const ACCEPTED_STATUSES: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

/// How a response status is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDisposition {
    Accepted,
    /// The service is already in the state the action would produce
    AlreadyApplied,
    Rejected,
}

/// Classify a response status for a call. `action` is `None` for state reads.
pub fn classify_status(status: StatusCode, action: Option<Action>) -> StatusDisposition {
    if ACCEPTED_STATUSES.contains(&status) {
        return StatusDisposition::Accepted;
    }
    match action {
        Some(action)
            if status == StatusCode::UNPROCESSABLE_ENTITY && action != Action::Upgrade =>
        {
            StatusDisposition::AlreadyApplied
        }
        _ => StatusDisposition::Rejected,
    }
}

/// HTTP client for the orchestration API
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self, UpgradeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpgradeError::Config(format!("Unable to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Read the current resource representation
    pub async fn get(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let url = parse_url(endpoint)?;
        debug!("GET {}", url);

        let request = authorize(self.client.get(url.clone()), credentials);
        let response = send(request, &url).await?;
        read_snapshot(response, &url, None).await
    }

    /// Invoke an action, optionally with a JSON body
    pub async fn post_action<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        credentials: &Credentials,
        action: Action,
        body: Option<&B>,
    ) -> Result<ServiceSnapshot, UpgradeError> {
        let mut url = parse_url(endpoint)?;
        url.query_pairs_mut().append_pair("action", action.as_str());
        debug!("POST {}", url);

        let mut request = authorize(self.client.post(url.clone()), credentials);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = send(request, &url).await?;
        read_snapshot(response, &url, Some(action)).await
    }
}

fn parse_url(endpoint: &str) -> Result<Url, UpgradeError> {
    Url::parse(endpoint)
        .map_err(|e| UpgradeError::Config(format!("Invalid url '{}': {}", endpoint, e)))
}

fn authorize(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    if credentials.is_empty() {
        return request;
    }
    let user = credentials.user.as_deref().unwrap_or_default();
    let password = credentials
        .password
        .as_ref()
        .map(|p| p.expose_secret().to_string());
    request.basic_auth(user, password)
}

async fn send(request: RequestBuilder, url: &Url) -> Result<Response, UpgradeError> {
    request.send().await.map_err(|e| {
        error!("Request to {} failed: {}", url, e);
        UpgradeError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    })
}

async fn read_snapshot(
    response: Response,
    url: &Url,
    action: Option<Action>,
) -> Result<ServiceSnapshot, UpgradeError> {
    let status = response.status();
    let body = response.bytes().await.map_err(|e| UpgradeError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    match classify_status(status, action) {
        StatusDisposition::Accepted => {}
        StatusDisposition::AlreadyApplied => {
            warn!("{} returned {}, service already in requested state", url, status);
        }
        StatusDisposition::Rejected => {
            let description = describe_failure(status, &body);
            error!("Invalid status code from {}: {} {}", url, status, description);
            return Err(UpgradeError::RemoteStatus {
                url: url.to_string(),
                status,
                description,
            });
        }
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ServiceSnapshot::empty());
    }
    serde_json::from_slice(&body)
        .map(ServiceSnapshot::new)
        .map_err(|e| UpgradeError::Payload(format!("Unreadable response from {}: {}", url, e)))
}

fn describe_failure(status: StatusCode, body: &[u8]) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => format!("{}: {}", reason, message),
        _ => reason.to_string(),
    }
}
