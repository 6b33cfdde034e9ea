//! HTTP schedule endpoint (JSON session export).

use std::time::Duration;

use async_trait::async_trait;

use super::ScheduleEndpoint;
use crate::config::EndpointConfig;
use crate::error::{SchedError, SchedResult};
use crate::wire::WireEvent;

const EXPORT_PATH: &str = "/api/session/export";

/// Fetches the schedule with `GET {base_url}/api/session/export?format=json`.
///
/// The API key travels in the query string, so it is stripped from every
/// error this endpoint returns.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpEndpoint {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn from_config(config: &EndpointConfig) -> SchedResult<Self> {
        let mut endpoint = Self::new(&config.base_url);
        endpoint.api_key = config.api_key.clone();
        endpoint.timeout = config.timeout()?;
        Ok(endpoint)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, EXPORT_PATH)
    }
}

#[async_trait]
impl ScheduleEndpoint for HttpEndpoint {
    async fn get_schedule(&self) -> SchedResult<Vec<WireEvent>> {
        let url = self.url();

        let mut request = self.http.get(&url).query(&[("format", "json")]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(%url, "fetching schedule");

        let response = request
            .send()
            .await
            .map_err(|e| {
                SchedError::Transport(format!("Request to {url} failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SchedError::Transport(format!(
                "Schedule API returned {status}: {}",
                body.trim()
            )));
        }

        let records: Vec<WireEvent> = response
            .json()
            .await
            .map_err(|e| {
                SchedError::Transport(format!("Failed to parse schedule: {}", e.without_url()))
            })?;

        tracing::debug!(count = records.len(), "fetched schedule");

        Ok(records)
    }
}
