
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::OpenAiConfig;
use crate::{RagError, Result};

/// Body of a successful call with the status it arrived with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Upstream error for a successful response whose body cannot be used
    #[inline]
    pub fn malformed(&self, message: String) -> RagError {
        RagError::Upstream {
            status: self.status,
            body: message,
        }
    }
}

/// Blocking JSON client for an OpenAI-compatible API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    authorization: String,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Fails before any network I/O if `api_key` is blank
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "API key cannot be null or empty".to_string(),
            ));
        }

        let base_url = config.endpoint_base()?;

        Ok(Self {
            base_url,
            authorization: format!("Bearer {}", api_key.trim()),
            agent: build_agent(Duration::from_secs(config.timeout_secs)),
        })
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` as JSON to `path` beneath the base URL and return the raw
    /// response of a successful call
    #[inline]
    pub fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RagError::Configuration(format!("Failed to build {} URL: {}", path, e)))?;

        let request_json = serde_json::to_string(body)
            .map_err(|e| RagError::Other(anyhow::anyhow!("Failed to serialize request: {}", e)))?;

        debug!("POST {} ({} bytes)", url, request_json.len());

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Authorization", self.authorization.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .map_err(|e| RagError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| RagError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!("{} returned HTTP {}", url, status.as_u16());
            return Err(RagError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("{} returned HTTP {} ({} bytes)", url, status.as_u16(), text.len());
        Ok(ApiResponse {
            status: status.as_u16(),
            body: text,
        })
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
