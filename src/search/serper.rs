//! Serper Client
//!
//! Google web search through the Serper API (`POST /search`, `X-API-KEY`
//! header, `{"q": ...}` body). The JSON payload's `organic` list is
//! normalized into [`SearchResult`] values.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{SearchConfig, MAX_RESULTS};
use crate::models::SearchResult;
use super::normalize::{normalize, organic_records};
use super::{SearchError, SearchProvider};

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
}

/// Serper client for organic web search
pub struct SerperClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    max_results: usize,
    timeout: Duration,
}

impl SerperClient {
    /// Create a new client against the public endpoint with default settings
    pub fn new(api_key: Option<String>) -> Result<Self, SearchError> {
        Self::from_config(&SearchConfig::with_api_key(api_key))
    }

    /// Configure client from config, with a bounded request timeout
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: config.endpoint.clone(),
            max_results: config.max_results.clamp(1, MAX_RESULTS),
            timeout,
        })
    }

    /// Point the client at another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    fn name(&self) -> &str {
        "serper"
    }

    fn ensure_configured(&self) -> Result<(), SearchError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(SearchError::NoApiKey),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NoApiKey)?;

        info!(query = %query, "Searching the web via Serper");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest { q: query })
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Serper request failed");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SearchError::MalformedResult(format!("invalid JSON body: {}", e)))?;

        debug!("Raw Serper response received");

        let results = normalize(organic_records(&payload)?, self.max_results)?;

        info!(count = results.len(), "Serper search completed");
        Ok(results)
    }
}
