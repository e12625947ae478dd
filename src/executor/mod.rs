//! Task execution
//!
//! This module handles:
//! - Running task commands through the configured shell with timeouts
//! - Retrying failed attempts according to each task's retry policy
//! - Scheduling tasks in dependency order up to a parallelism ceiling
//! - Simulating tasks in dry-run mode
//! - Handing agent tasks to an `AgentDispatcher`

mod config;
mod dispatch;
pub mod process;
mod retry;
mod scheduler;


use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::PlanError;
use crate::models::{TaskResult, TaskStatus};
use crate::plan::graph::ExecutionGraph;
use crate::plan::schema::{Plan, Task, TaskAction};

pub use config::{default_shell, CancelFlag, ExecutorConfig};
pub use dispatch::{AgentDispatcher, DeferredAgentDispatcher};
use process::{resolve_working_dir, ProcessSpec};

/// Prefix of the output synthesized for simulated tasks
pub const DRY_RUN_MARKER: &str = "[DRY RUN]";

/// Runs tasks, either one at a time or a whole plan in dependency order
#[derive(Clone)]
pub struct TaskExecutor {
    config: ExecutorConfig,
    cancel: CancelFlag,
    dispatcher: Arc<dyn AgentDispatcher>,
}

impl TaskExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
            dispatcher: Arc::new(DeferredAgentDispatcher),
        }
    }

    /// Share a cancellation flag with the caller (e.g. a signal handler)
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AgentDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Execute every task of a plan in dependency order.
    ///
    /// Task failures are recorded in the returned results, never raised.
    /// The only error is an invalid dependency graph, which cannot happen
    /// for plans produced by the parser.
    pub fn execute(&self, plan: &Plan) -> Result<Vec<TaskResult>, PlanError> {
        self.execute_tasks(&plan.tasks)
    }

    pub fn execute_tasks(&self, tasks: &[Task]) -> Result<Vec<TaskResult>, PlanError> {
        let graph = ExecutionGraph::build(tasks)?;
        info!(
            tasks = tasks.len(),
            max_parallel = self.config.max_parallel,
            dry_run = self.config.dry_run,
            "executing tasks"
        );
        Ok(scheduler::run_graph(self, tasks, &graph))
    }

    /// Run a single task to a terminal result, ignoring its dependencies
    #[instrument(skip_all, fields(task = %task.id))]
    pub fn run_task(&self, task: &Task) -> TaskResult {
        let result = match &task.action {
            TaskAction::Command { command, .. } if self.config.dry_run => {
                simulate(task, format!("{DRY_RUN_MARKER} would execute: {command}"))
            }
            TaskAction::Command { command, .. } => self.run_command(task, command),
            TaskAction::Agent {
                kind,
                input,
                strategy,
            } if self.config.dry_run => simulate(
                task,
                format!(
                    "{DRY_RUN_MARKER} would dispatch {kind} agent with input '{}' ({} strategy)",
                    input.kind,
                    strategy.as_str()
                ),
            ),
            TaskAction::Agent { .. } => self.dispatcher.dispatch(task),
        };

        match result.status {
            TaskStatus::Failed => warn!("{}", result.summary()),
            _ => info!("{}", result.summary()),
        }
        result
    }

    fn run_command(&self, task: &Task, command: &str) -> TaskResult {
        let start_time = Utc::now();
        let started = Instant::now();

        if self.cancel.is_cancelled() {
            let mut result = TaskResult::skipped(&task.id, "run cancelled before the task started");
            result.status = TaskStatus::Failed;
            return result;
        }

        let working_dir = resolve_working_dir(
            self.config.base_dir.as_deref(),
            task.working_dir.as_deref(),
        );
        let timeout = task.timeout.or(self.config.default_timeout);
        let spec = ProcessSpec {
            command,
            shell: &self.config.shell,
            working_dir: working_dir.as_deref(),
            env: &task.env,
            timeout,
        };

        let outcome = retry::run_with_retry(&task.id, task.retry.as_ref(), &self.cancel, |_| {
            process::run_process(&spec, &self.cancel)
        });

        let mut result = TaskResult {
            task_id: task.id.clone(),
            status: TaskStatus::Failed,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            start_time,
            end_time: Utc::now(),
            duration: started.elapsed(),
            attempts: outcome.attempts,
            timed_out: false,
            simulated: false,
            error: None,
        };

        match outcome.result {
            Ok(process) => {
                if process.succeeded() {
                    result.status = TaskStatus::Completed;
                }
                result.error = if process.cancelled {
                    Some("run cancelled".to_string())
                } else if process.timed_out {
                    Some(format!(
                        "timed out after {}s",
                        timeout.map(|t| t.as_secs_f64()).unwrap_or_default()
                    ))
                } else {
                    match process.exit_code {
                        Some(0) => None,
                        Some(code) => Some(format!("command exited with code {code}")),
                        None => Some("command terminated by a signal".to_string()),
                    }
                };
                result.exit_code = process.exit_code;
                result.stdout = process.stdout;
                result.stderr = process.stderr;
                result.timed_out = process.timed_out;
            }
            Err(e) => {
                result.error = Some(e.to_string());
            }
        }

        result
    }
}

/// Build a completed result for a task that was not really run
fn simulate(task: &Task, stdout: String) -> TaskResult {
    let now = Utc::now();
    TaskResult {
        task_id: task.id.clone(),
        status: TaskStatus::Completed,
        exit_code: Some(0),
        stdout,
        stderr: String::new(),
        start_time: now,
        end_time: now,
        duration: std::time::Duration::ZERO,
        attempts: 1,
        timed_out: false,
        simulated: true,
        error: None,
    }
}
