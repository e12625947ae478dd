//! Plan model type definitions

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::gate::QualityGateConfig;
use super::kinds::{AgentKind, ExecutionStrategy, GateKind, TaskKind};
use crate::models::{TaskResult, TaskStatus};

/// A validated plan: metadata, tasks in declaration order, and quality gates
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub metadata: PlanMetadata,
    /// Declaration order is the scheduling tie-break among ready tasks
    pub tasks: Vec<Task>,
    pub quality_gates: Vec<QualityGateConfig>,
}

impl Plan {
    pub fn new(metadata: PlanMetadata) -> Self {
        Self {
            metadata,
            tasks: Vec::new(),
            quality_gates: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_gate(mut self, gate: QualityGateConfig) -> Self {
        self.quality_gates.push(gate);
        self
    }

    /// Look up a task by identifier
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Copy execution results onto the matching tasks.
    ///
    /// Tasks without a result keep their current status, so tasks that were
    /// never attempted stay `Pending`.
    pub fn attach_results(&mut self, results: &[TaskResult]) {
        for result in results {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == result.task_id) {
                task.status = result.status;
                task.result = Some(result.clone());
            }
        }
    }
}

/// Descriptive plan metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub tags: Vec<String>,
}

impl PlanMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

/// What a task does when it runs.
///
/// Command tasks and agent tasks share one identifier space and one
/// dependency graph; only the payload differs.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    /// Run a shell command
    Command { kind: TaskKind, command: String },
    /// Hand a structured input to an external agent dispatcher
    Agent {
        kind: AgentKind,
        input: AgentInput,
        strategy: ExecutionStrategy,
    },
}

/// Structured payload of an agent task
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInput {
    /// Kind tag describing the request (e.g. "codebase-analysis")
    pub kind: String,
    pub context: BTreeMap<String, serde_json::Value>,
}

/// Retry policy applied after a non-zero exit or a timeout
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one (>= 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Factor applied to the delay for each subsequent retry
    pub backoff_multiplier: Option<f64>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff_multiplier: None,
        }
    }

    pub fn with_backoff(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Delay to wait before retry number `retry` (1 = first retry).
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        match self.backoff_multiplier {
            Some(multiplier) if retry > 1 => {
                let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
                let secs = self.delay.as_secs_f64() * multiplier.powi(exponent);
                if secs.is_finite() && secs >= 0.0 {
                    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
                } else {
                    Duration::MAX
                }
            }
            _ => self.delay,
        }
    }
}

/// A schedulable unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub action: TaskAction,
    pub working_dir: Option<PathBuf>,
    /// Overrides merged onto the ambient environment of the spawned process
    pub env: BTreeMap<String, String>,
    pub depends_on: Vec<String>,
    pub timeout: Option<Duration>,
    pub retry: Option<RetryPolicy>,
    /// Set only by execution
    pub status: TaskStatus,
    /// Set only by execution
    pub result: Option<TaskResult>,
}

impl Task {
    /// Create a generic command task
    pub fn command(
        id: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self::with_action(
            id,
            name,
            TaskAction::Command {
                kind: TaskKind::Command,
                command: command.into(),
            },
        )
    }

    /// Create an agent task
    pub fn agent(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: AgentKind,
        input: AgentInput,
        strategy: ExecutionStrategy,
    ) -> Self {
        Self::with_action(
            id,
            name,
            TaskAction::Agent {
                kind,
                input,
                strategy,
            },
        )
    }

    fn with_action(id: impl Into<String>, name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            action,
            working_dir: None,
            env: BTreeMap::new(),
            depends_on: Vec::new(),
            timeout: None,
            retry: None,
            status: TaskStatus::Pending,
            result: None,
        }
    }

    /// Change the kind of a command task; agent tasks are left untouched
    pub fn of_kind(mut self, kind: TaskKind) -> Self {
        if let TaskAction::Command { kind: current, .. } = &mut self.action {
            *current = kind;
        }
        self
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Shell command for command tasks
    pub fn command_line(&self) -> Option<&str> {
        match &self.action {
            TaskAction::Command { command, .. } => Some(command),
            TaskAction::Agent { .. } => None,
        }
    }

    pub fn is_agent_task(&self) -> bool {
        matches!(self.action, TaskAction::Agent { .. })
    }

    /// Gate kind this task maps to, if it is a gate-shaped command task
    pub fn gate_kind(&self) -> Option<GateKind> {
        match &self.action {
            TaskAction::Command { kind, .. } => kind.gate_kind(),
            TaskAction::Agent { .. } => None,
        }
    }

    /// Kind tag as written in plan documents
    pub fn kind_label(&self) -> &'static str {
        match &self.action {
            TaskAction::Command { kind, .. } => kind.as_str(),
            TaskAction::Agent { kind, .. } => kind.as_str(),
        }
    }
}
