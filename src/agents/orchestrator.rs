use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::types::{AppError, AppResult};
use super::task::{AgentProfile, Task};

/// Runs a task against its tool set and returns a value meant to match the
/// task's response format. `Ok(None)` means the run produced no answer.
///
/// The returned value is untrusted: callers validate it before use.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, agent: &AgentProfile, task: &Task) -> AppResult<Option<Value>>;
}

/// Calls the task's single tool with the task input, no model involved.
#[derive(Debug, Default, Clone)]
pub struct DirectOrchestrator;

#[async_trait]
impl Orchestrator for DirectOrchestrator {
    fn name(&self) -> &str {
        "direct"
    }

    async fn run(&self, _agent: &AgentProfile, task: &Task) -> AppResult<Option<Value>> {
        let tool = task.tools.only().ok_or_else(|| {
            AppError::Orchestrator(format!(
                "direct orchestration needs exactly one tool, got {}",
                task.tools.len()
            ))
        })?;

        let results = tool.invoke(task.input.as_str()).await?;
        debug!(tool = tool.name(), count = results.len(), "Direct tool call finished");

        Ok(Some(json!({ "results": results })))
    }
}
