//! Dispatch seam for agent tasks

use tracing::info;

use crate::models::TaskResult;
use crate::plan::schema::{Task, TaskAction};

/// Runs agent tasks on behalf of the executor.
///
/// Agent tasks carry a structured input instead of a command; what runs them
/// is supplied by the embedding application.
pub trait AgentDispatcher: Send + Sync {
    /// Run an agent task to a terminal result
    fn dispatch(&self, task: &Task) -> TaskResult;
}

/// Default dispatcher: records agent tasks as skipped
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredAgentDispatcher;

impl AgentDispatcher for DeferredAgentDispatcher {
    fn dispatch(&self, task: &Task) -> TaskResult {
        let detail = match &task.action {
            TaskAction::Agent {
                kind,
                input,
                strategy,
            } => format!("{kind} agent, input '{}', {} strategy", input.kind, strategy.as_str()),
            TaskAction::Command { .. } => "not an agent task".to_string(),
        };
        info!(task = %task.id, "{detail}: no agent dispatcher configured");
        TaskResult::skipped(
            &task.id,
            format!("agent task requires an external dispatcher ({detail})"),
        )
    }
}
