//! LLM-driven orchestration
//!
//! The model receives the agent profile as its system prompt, the task as the
//! user turn and the tool set as callable functions. Tool calls are executed
//! and fed back until the model answers with JSON content or the step budget
//! runs out. With reflection enabled the first answer is sent back once for
//! self-review.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::llm::LLM;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, ToolCall};
use super::orchestrator::Orchestrator;
use super::task::{AgentProfile, Task};

const REFLECTION_PROMPT: &str = "Review your answer against the task and the schema. \
Keep only results that came from the search tool output, in their original order. \
Reply with the corrected JSON object only.";

#[derive(Deserialize)]
struct QueryArguments {
    query: String,
}

pub struct ChatOrchestrator {
    llm: LLM,
    temperature: f32,
}

impl ChatOrchestrator {
    pub fn new(llm: LLM) -> Self {
        Self {
            llm,
            temperature: 0.0,
        }
    }

    fn request(&self, task: &Task, messages: &[LLMMessage]) -> LLMRequest {
        LLMRequest {
            model: self.llm.model().to_string(),
            messages: messages.to_vec(),
            tools: task.tools.definitions(),
            max_tokens: Some(2048),
            temperature: Some(self.temperature),
            json_response: true,
        }
    }

    /// Executes every requested call. Tool failures end the run.
    async fn execute_tool_calls(
        &self,
        task: &Task,
        calls: &[ToolCall],
        messages: &mut Vec<LLMMessage>,
    ) -> AppResult<()> {
        for call in calls {
            let Some(tool) = task.tools.get(&call.name) else {
                warn!(tool = %call.name, "Model requested an unknown tool");
                messages.push(LLMMessage::tool_result(
                    &call.id,
                    json!({ "error": format!("unknown tool: {}", call.name) }).to_string(),
                ));
                continue;
            };

            let query = query_argument(&call.arguments).unwrap_or_else(|| {
                debug!(arguments = %call.arguments, "Unusable tool arguments, using task input");
                task.input.as_str().to_string()
            });

            let results = tool.invoke(&query).await?;
            let content = serde_json::to_string(&results)
                .map_err(|e| AppError::Internal(format!("Failed to encode tool output: {}", e)))?;
            messages.push(LLMMessage::tool_result(&call.id, content));
        }
        Ok(())
    }

    async fn reflect(
        &self,
        task: &Task,
        messages: &mut Vec<LLMMessage>,
        answer_text: String,
        answer: Value,
    ) -> Value {
        messages.push(LLMMessage::assistant(answer_text));
        messages.push(LLMMessage::user(REFLECTION_PROMPT));

        match self.llm.create_chat_completion(&self.request(task, messages)).await {
            Ok(response) => match response.content.as_deref().map(parse_json_answer) {
                Some(Ok(reviewed)) => {
                    debug!("Reflection produced a revised answer");
                    reviewed
                }
                _ => {
                    warn!("Reflection gave no usable answer, keeping the first one");
                    answer
                }
            },
            Err(e) => {
                warn!(error = %e, "Reflection request failed, keeping the first answer");
                answer
            }
        }
    }
}

#[async_trait]
impl Orchestrator for ChatOrchestrator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn run(&self, agent: &AgentProfile, task: &Task) -> AppResult<Option<Value>> {
        info!(
            provider = self.llm.provider_name(),
            model = self.llm.model(),
            tools = ?task.tools.names(),
            "Running task with LLM orchestrator"
        );

        let mut messages = vec![LLMMessage::system(agent.system_prompt()), LLMMessage::user(task.prompt())];

        for step in 1..=agent.max_steps {
            let response = self
                .llm
                .create_chat_completion(&self.request(task, &messages))
                .await?;

            if !response.tool_calls.is_empty() {
                debug!(step, calls = response.tool_calls.len(), "Model requested tool calls");
                messages.push(LLMMessage::assistant_tool_calls(response.tool_calls.clone()));
                self.execute_tool_calls(task, &response.tool_calls, &mut messages)
                    .await?;
                continue;
            }

            let Some(text) = response.content else {
                warn!(step, "Model returned neither content nor tool calls");
                return Ok(None);
            };

            let answer = parse_json_answer(&text)?;
            info!(step, "Model produced an answer");

            if agent.reflection {
                return Ok(Some(self.reflect(task, &mut messages, text, answer).await));
            }
            return Ok(Some(answer));
        }

        warn!(max_steps = agent.max_steps, "Step budget exhausted without an answer");
        Ok(None)
    }
}

/// The `query` argument of a tool call, if present and non-blank
fn query_argument(arguments: &str) -> Option<String> {
    serde_json::from_str::<QueryArguments>(arguments)
        .ok()
        .map(|args| args.query)
        .filter(|q| !q.trim().is_empty())
}

/// Parses model output as JSON, tolerating a surrounding markdown fence.
fn parse_json_answer(text: &str) -> AppResult<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| {
        AppError::MalformedResult(format!("orchestrator answer is not valid JSON: {}", e))
    })
}
