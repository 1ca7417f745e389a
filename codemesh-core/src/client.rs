//! HTTP client for the analysis service
//!
//! Thin wrapper over the two endpoints the dashboard consumes:
//! `POST /analyze` for prompt submissions and `GET /events` for the live
//! feed, plus a `/health` probe for the header indicator. Every failure is
//! converted to [`Error::Transport`]; nothing here retries or panics.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::types::{AnalysisRequest, EventRecord};

/// Response body from POST /analyze
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    /// The raw reply text; absent or null is a failure
    #[serde(default)]
    analysis: Option<String>,
}

/// HTTP client for the analysis service API
#[derive(Clone)]
pub struct MeshClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MeshClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or the underlying
    /// HTTP client cannot be built.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Submit one analysis request and return the raw reply text.
    ///
    /// One round trip, no retries. A missing or null `analysis` field in an
    /// otherwise successful response is a failure: there is nothing to show.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let url = format!("{}/analyze", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let body: AnalyzeResponse = response
                .json()
                .await
                .map_err(|e| Error::Transport(format!("failed to parse response: {}", e)))?;
            body.analysis
                .ok_or_else(|| Error::Transport("no analysis returned".to_string()))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Transport(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    /// Fetch the current event feed.
    ///
    /// The server returns the full ordered collection; the caller replaces
    /// its copy wholesale.
    pub async fn recent_events(&self) -> Result<Vec<EventRecord>> {
        let url = format!("{}/events", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let events: Vec<EventRecord> = response
                .json()
                .await
                .map_err(|e| Error::Transport(format!("failed to parse response: {}", e)))?;
            Ok(events)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Transport(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    /// Check whether the analysis service is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
