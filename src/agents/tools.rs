//! Tools handed to an orchestrator
//!
//! A tool is a named capability with the fixed signature
//! `query -> Vec<SearchResult>`. Tools are collected into a [`Toolset`] that
//! is passed explicitly with each task; nothing is registered globally.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::models::SearchResult;
use crate::search::SearchProvider;
use crate::types::{AppResult, ToolDefinition};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the call arguments: a single `query` string.
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, query: &str) -> AppResult<Vec<SearchResult>>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Web search backed by a [`SearchProvider`]
pub struct SearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl SearchTool {
    pub const NAME: &'static str = "search";

    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the web and return up to ten organic results, each with a title, link and snippet."
    }

    async fn invoke(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        info!(tool = Self::NAME, provider = self.provider.name(), query = %query, "Invoking tool");
        Ok(self.provider.search(query).await?)
    }
}

/// The capabilities available to one task
#[derive(Clone, Default)]
pub struct Toolset {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool. A later tool with the same name replaces the earlier one.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// The tool, when the set holds exactly one.
    pub fn only(&self) -> Option<&Arc<dyn Tool>> {
        match self.tools.as_slice() {
            [tool] => Some(tool),
            _ => None,
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;
    use crate::types::AppError;

    struct StaticProvider(Result<Vec<SearchResult>, u16>);

    #[async_trait]
    impl SearchProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
            match &self.0 {
                Ok(results) => Ok(results.clone()),
                Err(status) => Err(SearchError::Upstream {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_search_tool_returns_provider_results() {
        let tool = SearchTool::new(Arc::new(StaticProvider(Ok(vec![SearchResult::default()]))));
        let results = tool.invoke("rust").await.unwrap();
        assert_eq!(results, vec![SearchResult::default()]);
    }

    #[tokio::test]
    async fn test_search_tool_maps_provider_errors() {
        let tool = SearchTool::new(Arc::new(StaticProvider(Err(500))));
        let err = tool.invoke("rust").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamSearch { .. }));
    }

    #[test]
    fn test_definition_describes_query_argument() {
        let tool = SearchTool::new(Arc::new(StaticProvider(Ok(vec![]))));
        let definition = tool.definition();
        assert_eq!(definition.name, "search");
        assert_eq!(definition.parameters["required"], json!(["query"]));
    }

    #[test]
    fn test_toolset_lookup() {
        let tools = Toolset::new().with(SearchTool::new(Arc::new(StaticProvider(Ok(vec![])))));
        assert_eq!(tools.len(), 1);
        assert!(tools.get("search").is_some());
        assert!(tools.get("browse").is_none());
        assert!(tools.only().is_some());
        assert_eq!(tools.names(), vec!["search"]);
        assert!(Toolset::new().only().is_none());
    }

    #[test]
    fn test_toolset_replaces_same_name() {
        let tools = Toolset::new()
            .with(SearchTool::new(Arc::new(StaticProvider(Ok(vec![])))))
            .with(SearchTool::new(Arc::new(StaticProvider(Err(500)))));
        assert_eq!(tools.len(), 1);
    }
}
