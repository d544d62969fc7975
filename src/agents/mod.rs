//! Agent System
//!
//! The request-to-result pipeline behind `POST /search/`:
//!
//! - **Tools**: capabilities handed to an orchestrator (`SearchTool`)
//! - **Task**: what to do, with which tools, returning which shape
//! - **Orchestrators**: `DirectOrchestrator` (calls the tool itself) and
//!   `ChatOrchestrator` (lets an LLM decide how to use the tool)
//! - **Search Agent**: validates the orchestrator's answer and builds the
//!   response
//!
//! ## Pipeline Overview
//!
//! ```text
//! SearchQuery
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Search    │  → Builds the task and tool set
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐      ┌─────────────┐
//! │Orchestrator │ ───▶ │ SearchTool  │ → Serper
//! └─────────────┘      └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Validate   │  → Normalized, at most ten results
//! └─────────────┘
//!      │
//!      ▼
//!  SearchResponse
//! ```

pub mod chat;
pub mod orchestrator;
pub mod search;
pub mod task;
pub mod tools;

// Re-export main components
pub use chat::ChatOrchestrator;
pub use orchestrator::{DirectOrchestrator, Orchestrator};
pub use search::{validate_output, SearchAgent};
pub use task::{AgentProfile, ResponseFormat, Task};
pub use tools::{SearchTool, Tool, Toolset};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, OrchestratorMode};
use crate::llm::LLM;
use crate::search::SerperClient;
use crate::types::AppResult;

/// Chooses the orchestrator for the configured mode.
///
/// `Auto` uses the LLM when credentials for the default model exist and
/// falls back to direct tool calls otherwise.
pub fn build_orchestrator(config: &Config) -> AppResult<Arc<dyn Orchestrator>> {
    match config.agent.orchestrator {
        OrchestratorMode::Direct => Ok(Arc::new(DirectOrchestrator)),
        OrchestratorMode::Llm => Ok(Arc::new(ChatOrchestrator::new(LLM::from_config(&config.llm)?))),
        OrchestratorMode::Auto if config.llm.has_credentials() => {
            let llm = LLM::from_config(&config.llm)?;
            info!(provider = llm.provider_name(), model = llm.model(), "Using LLM orchestrator");
            Ok(Arc::new(ChatOrchestrator::new(llm)))
        }
        OrchestratorMode::Auto => {
            warn!(
                model = %config.llm.default_model,
                "No LLM credentials configured, calling the search tool directly"
            );
            Ok(Arc::new(DirectOrchestrator))
        }
    }
}

/// Wires the Serper client and the configured orchestrator into a `SearchAgent`.
pub fn build_search_agent(config: &Config) -> AppResult<SearchAgent> {
    let provider = Arc::new(SerperClient::from_config(&config.search)?);
    if !config.search.is_configured() {
        warn!("SERPAPI_API_KEY is not set; search requests will fail until it is");
    }
    let orchestrator = build_orchestrator(config)?;
    Ok(SearchAgent::new(
        provider,
        orchestrator,
        AgentProfile::from(&config.agent),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_without_credentials_is_direct() {
        let config = Config::default();
        assert_eq!(build_orchestrator(&config).unwrap().name(), "direct");
    }

    #[test]
    fn test_auto_with_credentials_is_llm() {
        let mut config = Config::default();
        config.llm.azure_openai_api_key = Some("k".to_string());
        config.llm.azure_openai_endpoint = Some("https://example.openai.azure.com".to_string());
        assert_eq!(build_orchestrator(&config).unwrap().name(), "llm");
    }

    #[test]
    fn test_forced_llm_without_credentials_fails() {
        let mut config = Config::default();
        config.agent.orchestrator = OrchestratorMode::Llm;
        assert!(build_orchestrator(&config).is_err());
    }

    #[test]
    fn test_build_search_agent_without_key() {
        let agent = build_search_agent(&Config::default()).unwrap();
        assert!(!agent.search_configured());
        assert_eq!(agent.orchestrator_name(), "direct");
    }
}
