//! HTTP definition store.
//!
//! This store uses a synchronous `ureq` agent. Async callers wrap it in
//! [`super::AsyncStoreAdapter`], which moves calls onto `spawn_blocking`.

use super::DefinitionStore;
use crate::config::Config;
use crate::domain::TestId;
use crate::error::{StoreError, StoreResult};
use crate::models::TestFunctionMeta;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

const API_KEY_HEADER: &str = "X-API-Key";

/// Body of a save request.
#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    meta: &'a TestFunctionMeta,
    /// Base64-encoded payload
    payload: String,
}

/// Response to a save request.
#[derive(Debug, Deserialize)]
struct SaveResponse {
    version: u32,
}

/// Response wrapper for the listing endpoint.
#[derive(Debug, Deserialize)]
struct ListResponse {
    tests: Vec<TestFunctionMeta>,
}

/// Definition store behind an HTTP API.
#[derive(Clone)]
pub struct RemoteStore {
    base_url: String,
    api_key: String,
    project: String,
    agent: Arc<ureq::Agent>,
}

impl RemoteStore {
    /// Create a store from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.remote_url.clone().unwrap_or_default(),
            api_key: config.api_key.clone(),
            project: config.project.clone(),
            agent: Arc::new(agent),
        }
    }

    /// Create a store with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, api_key: String, project: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            api_key,
            project,
            agent: Arc::new(agent),
        }
    }

    fn tests_path(&self) -> String {
        format!(
            "/api/v2/project/{}/tests",
            urlencoding::encode(&self.project)
        )
    }

    fn test_path(&self, id: &TestId) -> String {
        format!("{}/{}", self.tests_path(), urlencoding::encode(id.as_str()))
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Execute a GET request with authentication.
    fn get(&self, path: &str) -> Result<ureq::Response, StoreError> {
        let start = Instant::now();
        let url = self.build_url(path);

        let result = self
            .agent
            .get(&url)
            .set(API_KEY_HEADER, &self.api_key)
            .set("Content-Type", "application/json")
            .call()
            .map_err(Self::map_error);

        tracing::debug!(url = %url, duration_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "GET");
        result
    }

    /// Execute a PUT request with authentication and JSON body.
    fn put(&self, path: &str, body: &impl Serialize) -> Result<ureq::Response, StoreError> {
        let start = Instant::now();
        let url = self.build_url(path);

        let result = self
            .agent
            .put(&url)
            .set(API_KEY_HEADER, &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(Self::map_error);

        match &result {
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status(), duration_ms = start.elapsed().as_millis() as u64, "PUT");
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "PUT failed");
            }
        }
        result
    }

    /// Map a ureq error to a StoreError.
    fn map_error(error: ureq::Error) -> StoreError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());

                match code {
                    401 | 403 => StoreError::Unauthorized,
                    404 => StoreError::NotFound(message),
                    _ => StoreError::ApiError {
                        status: code,
                        message,
                    },
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    StoreError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    StoreError::Timeout
                } else {
                    StoreError::HttpError(transport.to_string())
                }
            }
        }
    }

    fn read_body(response: ureq::Response) -> StoreResult<String> {
        response
            .into_string()
            .map_err(|e| StoreError::HttpError(e.to_string()))
    }
}

impl DefinitionStore for RemoteStore {
    fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>> {
        let response = match self.get(&self.test_path(id)) {
            Ok(response) => response,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let body = Self::read_body(response)?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32> {
        let request = SaveRequest {
            meta,
            payload: base64::engine::general_purpose::STANDARD.encode(payload),
        };
        let response = self.put(&self.test_path(&meta.uuid), &request)?;
        let body = Self::read_body(response)?;
        let saved: SaveResponse = serde_json::from_str(&body)?;
        Ok(saved.version)
    }

    fn list(&self) -> StoreResult<Vec<TestFunctionMeta>> {
        let response = self.get(&self.tests_path())?;
        let body = Self::read_body(response)?;
        let listed: ListResponse = serde_json::from_str(&body)?;
        Ok(listed.tests)
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base_url", &self.base_url)
            .field("project", &self.project)
            .finish()
    }
}
