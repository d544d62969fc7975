use serde_json::{json, Value};

use crate::config::{AgentConfig, MAX_RESULTS};
use crate::models::SearchQuery;
use super::tools::Toolset;

/// Who the agent is working as. Sent to the orchestrator with every task.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub job_title: String,
    pub company_url: String,
    pub company_objective: String,
    pub reflection: bool,
    pub max_steps: usize,
}

impl From<&AgentConfig> for AgentProfile {
    fn from(config: &AgentConfig) -> Self {
        Self {
            job_title: config.job_title.clone(),
            company_url: config.company_url.clone(),
            company_objective: config.company_objective.clone(),
            reflection: config.reflection,
            max_steps: config.max_steps.max(1),
        }
    }
}

impl AgentProfile {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a {} working for {}. Company objective: {}.\n\
             Use the provided tools to gather information; never invent search results.\n\
             When you are done, reply with a single JSON object and nothing else.",
            self.job_title, self.company_url, self.company_objective
        )
    }
}

/// The output contract an orchestrator must satisfy
#[derive(Debug, Clone)]
pub struct ResponseFormat {
    pub name: &'static str,
    pub schema: Value,
}

impl ResponseFormat {
    /// `{"results": [{"title", "link", "snippet"}]}`
    pub fn search_response() -> Self {
        Self {
            name: "SearchResponse",
            schema: json!({
                "type": "object",
                "properties": {
                    "results": {
                        "type": "array",
                        "maxItems": MAX_RESULTS,
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "link": { "type": "string" },
                                "snippet": { "type": "string" }
                            },
                            "required": ["title", "link", "snippet"]
                        }
                    }
                },
                "required": ["results"]
            }),
        }
    }
}

/// One unit of work for an orchestrator
#[derive(Clone)]
pub struct Task {
    pub input: SearchQuery,
    pub description: String,
    pub tools: Toolset,
    pub response_format: ResponseFormat,
}

impl Task {
    pub fn web_search(query: SearchQuery, tools: Toolset) -> Self {
        let description = format!(
            "Perform a web search for {} and return the top results with titles, links, and snippets.",
            query
        );
        Self {
            input: query,
            description,
            tools,
            response_format: ResponseFormat::search_response(),
        }
    }

    /// The task as a user message, with the response contract spelled out.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nRespond with JSON matching the {} schema:\n{}",
            self.description, self.response_format.name, self.response_format.schema
        )
    }
}
