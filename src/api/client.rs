/// HTTP client for the bot's dashboard API.
///
/// Talks to the backend's `/api/*` endpoints using the synchronous `ureq`
/// client. Each method maps to exactly one endpoint and returns the decoded
/// body or an [`ApiError`]. No retries are performed here or anywhere else;
/// a failed call is terminal for the operation that issued it.
///
/// The controller never calls this type directly. It produces request
/// effects which are executed against any [`Backend`], so tests can
/// substitute a scripted backend.
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    Config, ConfigUpdate, ErrorBody, MessageResponse, Stats, StatusRequest, StopResponse, ToggleId,
};
use crate::config::schema::ServerConfig;

/// Path prefix shared by every endpoint.
const API_PREFIX: &str = "/api";

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The operations the dashboard needs from the server.
pub trait Backend {
    /// `GET /api/config`
    fn fetch_config(&self) -> Result<Config, ApiError>;

    /// `GET /api/stats`
    fn fetch_stats(&self) -> Result<Stats, ApiError>;

    /// `POST /api/toggle/{autoresponder,autoemoji}`
    fn toggle(&self, id: ToggleId) -> Result<MessageResponse, ApiError>;

    /// `POST /api/status`
    fn set_status(&self, request: &StatusRequest) -> Result<MessageResponse, ApiError>;

    /// `POST /api/autopressure/stop`
    fn stop_auto_pressure(&self) -> Result<StopResponse, ApiError>;

    /// `PUT /api/config`
    fn update_config(&self, update: &ConfigUpdate) -> Result<Config, ApiError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous dashboard API client.
///
/// Cheap to clone; clones share the underlying connection pool, so one
/// client can be handed to every worker thread of the event loop.
#[derive(Debug, Clone)]
pub struct RemoteConfigClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl RemoteConfigClient {
    /// Build a client from the resolved `[server]` settings.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    /// Build a client for `base_url` (scheme + host + port, no `/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout applied by the agent.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{API_PREFIX}{endpoint}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let result = self.agent.get(&self.url(endpoint)).call();
        decode(endpoint, result)
    }

    fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let result = self
            .agent
            .post(&self.url(endpoint))
            .set("Content-Type", "application/json")
            .call();
        decode(endpoint, result)
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let result = self
            .agent
            .request(method, &self.url(endpoint))
            .send_json(body);
        decode(endpoint, result)
    }
}

impl Backend for RemoteConfigClient {
    fn fetch_config(&self) -> Result<Config, ApiError> {
        self.get("/config")
    }

    fn fetch_stats(&self) -> Result<Stats, ApiError> {
        self.get("/stats")
    }

    fn toggle(&self, id: ToggleId) -> Result<MessageResponse, ApiError> {
        self.post_empty(&format!("/toggle/{}", id.endpoint()))
    }

    fn set_status(&self, request: &StatusRequest) -> Result<MessageResponse, ApiError> {
        self.send("POST", "/status", request)
    }

    fn stop_auto_pressure(&self) -> Result<StopResponse, ApiError> {
        self.post_empty("/autopressure/stop")
    }

    fn update_config(&self, update: &ConfigUpdate) -> Result<Config, ApiError> {
        self.send("PUT", "/config", update)
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Turn a ureq outcome into a decoded body or an [`ApiError`].
fn decode<T: DeserializeOwned>(
    endpoint: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, ApiError> {
    match result {
        Ok(resp) => resp.into_json::<T>().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            details: e.to_string(),
        }),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                code,
                message: error_message(&body),
            })
        }
        Err(ureq::Error::Transport(t)) => Err(ApiError::Transport {
            endpoint: endpoint.to_string(),
            details: t.to_string(),
        }),
    }
}

/// Extract a user-facing message from an error body.
///
/// A JSON body contributes its `message` key (and nothing else). A body that
/// is not JSON at all is taken as plain text, which is how the server's
/// generic error helper answers.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => serde_json::from_value::<ErrorBody>(value)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty()),
        Err(_) => Some(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
