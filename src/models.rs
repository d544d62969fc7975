use std::sync::Arc;
use validator::Validate;
use crate::agents::SearchAgent;
use crate::config::Config;
use crate::types::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub agent: Arc<SearchAgent>,
}

/// Placeholder used when a result has no title.
pub const DEFAULT_TITLE: &str = "No Title";
/// Placeholder used when a result has no link.
pub const DEFAULT_LINK: &str = "#";
/// Placeholder used when a result has no snippet.
pub const DEFAULT_SNIPPET: &str = "No Description";

// API Request/Response types

#[derive(Debug, serde::Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 2048, message = "keyword must be 1 to 2048 characters"))]
    pub keyword: String,
}

/// A validated, immutable search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Accepts any keyword that is not blank. The text is kept verbatim.
    pub fn new(keyword: impl Into<String>) -> AppResult<Self> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(AppError::InvalidRequest("keyword must not be empty".to_string()));
        }
        Ok(Self(keyword))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<SearchRequest> for SearchQuery {
    type Error = AppError;

    fn try_from(request: SearchRequest) -> AppResult<Self> {
        request
            .validate()
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
        SearchQuery::new(request.keyword)
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl Default for SearchResult {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            link: DEFAULT_LINK.to_string(),
            snippet: DEFAULT_SNIPPET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
    /// The caller's keyword, echoed unmodified
    pub keyword: String,
    pub results: Vec<SearchResult>,
}

/// Error body returned for every failed request
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub orchestrator: String,
    pub search_configured: bool,
}
