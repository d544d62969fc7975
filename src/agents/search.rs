//! Search Agent
//!
//! Drives one search request: checks the provider is usable, hands the task
//! and its single search tool to the orchestrator, validates what comes back
//! and packages it with the caller's keyword. Holds no per-request state, so
//! one instance serves concurrent requests.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::MAX_RESULTS;
use crate::models::{SearchQuery, SearchResponse, SearchResult};
use crate::search::{normalize, SearchProvider};
use crate::types::{AppError, AppResult};
use super::orchestrator::Orchestrator;
use super::task::{AgentProfile, Task};
use super::tools::{SearchTool, Toolset};

pub struct SearchAgent {
    provider: Arc<dyn SearchProvider>,
    orchestrator: Arc<dyn Orchestrator>,
    profile: AgentProfile,
}

impl SearchAgent {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        orchestrator: Arc<dyn Orchestrator>,
        profile: AgentProfile,
    ) -> Self {
        Self {
            provider,
            orchestrator,
            profile,
        }
    }

    pub fn orchestrator_name(&self) -> &str {
        self.orchestrator.name()
    }

    pub fn search_configured(&self) -> bool {
        self.provider.ensure_configured().is_ok()
    }

    /// Runs the search for `query`. The response keyword is always the
    /// query text as received.
    pub async fn perform_search(&self, query: SearchQuery) -> AppResult<SearchResponse> {
        let span = info_span!("search", request_id = %Uuid::new_v4());

        async move {
            info!(keyword = %query, orchestrator = self.orchestrator.name(), "Search request received");

            match self.run(&query).await {
                Ok(results) => {
                    info!(count = results.len(), "Search completed");
                    Ok(SearchResponse {
                        keyword: query.as_str().to_string(),
                        results,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Search failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, query: &SearchQuery) -> AppResult<Vec<SearchResult>> {
        // Missing credentials must fail before any network call, including
        // the orchestrator's own model calls.
        self.provider.ensure_configured()?;

        let tools = Toolset::new().with(SearchTool::new(self.provider.clone()));
        let task = Task::web_search(query.clone(), tools);

        let output = self.orchestrator.run(&self.profile, &task).await?;
        validate_output(output)
    }
}

/// Checks an orchestrator answer against the `{"results": [...]}` contract.
///
/// No answer (`None`, `null`, `{}` or `""`) is `SearchUnavailable`; a value of
/// the wrong shape is `MalformedResult`. Entries are normalized again, so the
/// placeholders and the ten-result cap hold whatever the orchestrator did.
pub fn validate_output(output: Option<Value>) -> AppResult<Vec<SearchResult>> {
    let value = match output {
        None | Some(Value::Null) => return Err(AppError::SearchUnavailable),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(AppError::SearchUnavailable),
        Some(value) => value,
    };

    let object = match value.as_object() {
        Some(object) if object.is_empty() => return Err(AppError::SearchUnavailable),
        Some(object) => object,
        None => {
            return Err(AppError::MalformedResult(
                "orchestrator answer is not a JSON object".to_string(),
            ))
        }
    };

    match object.get("results") {
        Some(Value::Array(records)) => Ok(normalize(records, MAX_RESULTS)?),
        Some(_) => Err(AppError::MalformedResult(
            "`results` in orchestrator answer is not an array".to_string(),
        )),
        None => Err(AppError::MalformedResult(
            "orchestrator answer has no `results`".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DirectOrchestrator;
    use crate::config::Config;
    use crate::models::{DEFAULT_LINK, DEFAULT_SNIPPET};
    use crate::search::SearchError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        configured: bool,
        count: usize,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(configured: bool, count: usize) -> Self {
            Self {
                configured,
                count,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn ensure_configured(&self) -> Result<(), SearchError> {
            if self.configured {
                Ok(())
            } else {
                Err(SearchError::NoApiKey)
            }
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.count)
                .map(|i| SearchResult {
                    title: format!("{} #{}", query, i),
                    link: format!("https://example.com/{}", i),
                    snippet: "s".to_string(),
                })
                .collect())
        }
    }

    /// Returns a fixed value and counts runs.
    struct FixedOrchestrator {
        output: Option<Value>,
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Orchestrator for FixedOrchestrator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn run(&self, _agent: &AgentProfile, _task: &Task) -> AppResult<Option<Value>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    fn profile() -> AgentProfile {
        AgentProfile::from(&Config::default().agent)
    }

    fn agent_with(provider: Arc<CountingProvider>, orchestrator: Arc<dyn Orchestrator>) -> SearchAgent {
        SearchAgent::new(provider, orchestrator, profile())
    }

    #[tokio::test]
    async fn test_keyword_is_echoed_verbatim() {
        let provider = Arc::new(CountingProvider::new(true, 3));
        let agent = agent_with(provider.clone(), Arc::new(DirectOrchestrator));

        let response = agent
            .perform_search(SearchQuery::new("rust vs go").unwrap())
            .await
            .unwrap();

        assert_eq!(response.keyword, "rust vs go");
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].title, "rust vs go #0");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keyword_ignores_orchestrator_echo() {
        let orchestrator = Arc::new(FixedOrchestrator {
            output: Some(json!({ "keyword": "something else", "results": [] })),
            runs: AtomicUsize::new(0),
        });
        let agent = agent_with(Arc::new(CountingProvider::new(true, 0)), orchestrator);

        let response = agent.perform_search(SearchQuery::new("rust").unwrap()).await.unwrap();
        assert_eq!(response.keyword, "rust");
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_orchestrator() {
        let provider = Arc::new(CountingProvider::new(false, 3));
        let orchestrator = Arc::new(FixedOrchestrator {
            output: Some(json!({ "results": [] })),
            runs: AtomicUsize::new(0),
        });
        let agent = agent_with(provider.clone(), orchestrator.clone());

        let err = agent.perform_search(SearchQuery::new("rust").unwrap()).await.unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(orchestrator.runs.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_orchestrator_answer_is_unavailable() {
        let orchestrator = Arc::new(FixedOrchestrator {
            output: None,
            runs: AtomicUsize::new(0),
        });
        let agent = agent_with(Arc::new(CountingProvider::new(true, 1)), orchestrator);

        let err = agent.perform_search(SearchQuery::new("rust").unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::SearchUnavailable));
    }

    #[tokio::test]
    async fn test_orchestrator_output_is_capped_and_defaulted() {
        let records: Vec<Value> = (0..12).map(|i| json!({ "title": format!("t{}", i) })).collect();
        let orchestrator = Arc::new(FixedOrchestrator {
            output: Some(json!({ "results": records })),
            runs: AtomicUsize::new(0),
        });
        let agent = agent_with(Arc::new(CountingProvider::new(true, 0)), orchestrator);

        let response = agent.perform_search(SearchQuery::new("rust").unwrap()).await.unwrap();

        assert_eq!(response.results.len(), 10);
        assert_eq!(response.results[9].title, "t9");
        assert!(response
            .results
            .iter()
            .all(|r| r.link == DEFAULT_LINK && r.snippet == DEFAULT_SNIPPET));
    }

    #[test]
    fn test_validate_output_empty_cases() {
        for output in [None, Some(Value::Null), Some(json!({})), Some(json!(""))] {
            assert!(matches!(
                validate_output(output),
                Err(AppError::SearchUnavailable)
            ));
        }
    }

    #[test]
    fn test_validate_output_shape_errors() {
        for output in [
            json!([1, 2]),
            json!("some text"),
            json!({ "items": [] }),
            json!({ "results": "none" }),
            json!({ "results": [1] }),
        ] {
            assert!(matches!(
                validate_output(Some(output)),
                Err(AppError::MalformedResult(_))
            ));
        }
    }

    #[test]
    fn test_validate_output_empty_results_is_ok() {
        assert!(validate_output(Some(json!({ "results": [] }))).unwrap().is_empty());
    }
}
