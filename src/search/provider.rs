use async_trait::async_trait;
use thiserror::Error;
use crate::models::SearchResult;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SerpAPI API Key not found!")]
    NoApiKey,

    #[error("SerpAPI Request Failed ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed search result: {0}")]
    MalformedResult(String),
}

/// A source of organic web results for a free-text query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short identifier used in logs and tool descriptions
    fn name(&self) -> &str;

    /// Fails without touching the network when the provider cannot be used.
    fn ensure_configured(&self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}
