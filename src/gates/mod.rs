//! Quality gates
//!
//! A gate is run as a synthetic command task through the shared
//! `TaskExecutor`, then judged by its status, exit code and a kind-specific
//! scan of its output. Gates run one at a time in a fixed kind order and a
//! failing required gate stops the sequence.

pub mod defaults;
pub mod heuristics;
mod ordering;


use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::executor::TaskExecutor;
use crate::models::{QualityGateResult, TaskResult, TaskStatus};
use crate::plan::schema::{GateKind, QualityGateConfig, Task, TaskKind};

pub use defaults::{default_command, default_gates, default_timeout, gates_from_tasks};
pub use ordering::execution_order;

/// Characters of stdout/stderr kept in a gate's details payload
const OUTPUT_TAIL_CHARS: usize = 2000;

/// Runs quality gates through a `TaskExecutor`
pub struct QualityGateRunner {
    executor: TaskExecutor,
    tasks: Vec<Task>,
}

impl QualityGateRunner {
    pub fn new(executor: TaskExecutor) -> Self {
        Self {
            executor,
            tasks: Vec::new(),
        }
    }

    /// Tasks that gates may wrap through their `task_id`
    pub fn with_tasks(mut self, tasks: &[Task]) -> Self {
        self.tasks = tasks.to_vec();
        self
    }

    /// Build the task a gate executes.
    ///
    /// A gate wrapping a command task inherits its command, timeout, working
    /// directory, environment and retry policy; explicit gate settings win.
    /// Anything still unset falls back to the kind defaults. Agent tasks have
    /// no command to inherit, so a gate referencing one uses its own settings.
    pub fn gate_task(&self, gate: &QualityGateConfig) -> Task {
        let wrapped = gate
            .task_id
            .as_deref()
            .and_then(|id| match self.tasks.iter().find(|t| t.id == id) {
                Some(task) if task.command_line().is_some() => Some(task),
                Some(_) => {
                    warn!(
                        gate = %gate.id,
                        task = id,
                        "gate references an agent task; falling back to its own command"
                    );
                    None
                }
                None => {
                    warn!(
                        gate = %gate.id,
                        task = id,
                        "gate references a task that is not available"
                    );
                    None
                }
            });

        let command = gate
            .settings
            .command
            .clone()
            .or_else(|| wrapped.and_then(Task::command_line).map(str::to_string))
            .unwrap_or_else(|| default_command(gate.kind).to_string());
        let timeout = gate
            .settings
            .timeout
            .or_else(|| wrapped.and_then(|t| t.timeout))
            .unwrap_or_else(|| default_timeout(gate.kind));

        let mut task = Task::command(&gate.id, &gate.name, command)
            .of_kind(TaskKind::from(gate.kind))
            .with_timeout(timeout);
        if let Some(source) = wrapped {
            task.working_dir = source.working_dir.clone();
            task.env = source.env.clone();
            task.retry = source.retry.clone();
        }
        task
    }

    /// Run a single gate, regardless of its position in the order
    pub fn execute_gate(&self, gate: &QualityGateConfig) -> QualityGateResult {
        let task = self.gate_task(gate);
        let result = self.executor.run_task(&task);
        let passed = gate_passed(gate.kind, &result);

        let gate_result = QualityGateResult {
            gate_id: gate.id.clone(),
            kind: gate.kind,
            required: gate.required,
            status: result.status,
            passed,
            duration: result.duration,
            message: gate_message(gate, &result, passed),
            details: gate_details(gate, &task, &result),
            timestamp: Utc::now(),
        };

        if passed {
            info!(gate = %gate.id, "{}", gate_result.message);
        } else {
            warn!(gate = %gate.id, required = gate.required, "{}", gate_result.message);
        }
        gate_result
    }

    /// Run gates in execution order, stopping after the first failing
    /// required gate. Results are returned in the order the gates ran.
    pub fn execute_gates(&self, gates: &[QualityGateConfig]) -> Vec<QualityGateResult> {
        let mut results = Vec::new();

        for gate in execution_order(gates) {
            if self.executor.cancel_flag().is_cancelled() {
                info!("run cancelled, not starting remaining gates");
                break;
            }

            let result = self.execute_gate(gate);
            let blocking = result.is_blocking();
            results.push(result);

            if blocking {
                warn!(gate = %gate.id, "required gate failed, halting remaining gates");
                break;
            }
        }

        results
    }
}

/// Completed with exit code 0, and the output does not contradict it.
/// Simulated results carry no real output, so heuristics are not applied.
fn gate_passed(kind: GateKind, result: &TaskResult) -> bool {
    if !result.is_completed() || result.exit_code != Some(0) {
        return false;
    }
    result.simulated || heuristics::output_passes(kind, &result.combined_output(), result.exit_code)
}

fn gate_message(gate: &QualityGateConfig, result: &TaskResult, passed: bool) -> String {
    if passed {
        if result.simulated {
            return format!("{} passed (dry run)", gate.name);
        }
        return format!("{} passed", gate.name);
    }
    match (&result.status, &result.error) {
        (TaskStatus::Completed, _) => format!(
            "{} failed: {} output reported problems",
            gate.name,
            gate.kind.as_str()
        ),
        (_, Some(error)) => format!("{} failed: {error}", gate.name),
        (status, None) => format!("{} failed: task {status}", gate.name),
    }
}

fn gate_details(gate: &QualityGateConfig, task: &Task, result: &TaskResult) -> serde_json::Value {
    json!({
        "taskId": gate.task_id,
        "command": task.command_line(),
        "timeoutMs": task.timeout.map(|t| t.as_millis() as u64),
        "exitCode": result.exit_code,
        "attempts": result.attempts,
        "timedOut": result.timed_out,
        "simulated": result.simulated,
        "stdout": tail(&result.stdout, OUTPUT_TAIL_CHARS),
        "stderr": tail(&result.stderr, OUTPUT_TAIL_CHARS),
        "config": gate.settings.extra,
    })
}

/// Last `max` characters of `text`
fn tail(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    match text.char_indices().nth(count - max) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}
