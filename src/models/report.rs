use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::{QualityGateResult, TaskResult, TaskStatus};

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No task failed and no required gate failed
    Passed,
    /// A task failed or a required gate failed
    Failed,
    /// The run was interrupted before it could finish
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Passed => write!(f, "passed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Summary counts over task and gate results
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Tasks declared in the plan, including those never attempted
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub skipped_tasks: usize,
    /// Declared tasks with no result (halted before they could start)
    pub not_started_tasks: usize,
    /// Gates that produced a result
    pub total_gates: usize,
    pub passed_gates: usize,
    pub failed_gates: usize,
}

impl ReportSummary {
    pub fn from_results(
        declared_tasks: usize,
        tasks: &[TaskResult],
        gates: &[QualityGateResult],
    ) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let passed_gates = gates.iter().filter(|g| g.passed).count();

        Self {
            total_tasks: declared_tasks,
            completed_tasks: count(TaskStatus::Completed),
            failed_tasks: count(TaskStatus::Failed),
            skipped_tasks: count(TaskStatus::Skipped),
            not_started_tasks: declared_tasks.saturating_sub(tasks.len()),
            total_gates: gates.len(),
            passed_gates,
            failed_gates: gates.len() - passed_gates,
        }
    }
}

/// Aggregated result of executing a plan and its quality gates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub run_id: Uuid,
    pub plan_id: String,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "durationMs", with = "super::duration_ms")]
    pub duration: Duration,
    pub tasks: Vec<TaskResult>,
    pub gates: Vec<QualityGateResult>,
    pub summary: ReportSummary,
    /// Whether the run executed in dry-run mode
    pub dry_run: bool,
}

impl ExecutionReport {
    /// Build a report that ends now
    pub fn new(
        plan_id: impl Into<String>,
        declared_tasks: usize,
        start_time: DateTime<Utc>,
        tasks: Vec<TaskResult>,
        gates: Vec<QualityGateResult>,
        cancelled: bool,
    ) -> Self {
        let end_time = Utc::now();
        let summary = ReportSummary::from_results(declared_tasks, &tasks, &gates);
        let status = if cancelled {
            RunStatus::Cancelled
        } else if summary.failed_tasks > 0 || gates.iter().any(|g| g.is_blocking()) {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        };
        let duration = (end_time - start_time).to_std().unwrap_or(Duration::ZERO);

        Self {
            run_id: Uuid::new_v4(),
            plan_id: plan_id.into(),
            status,
            start_time,
            end_time,
            duration,
            tasks,
            gates,
            summary,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Passed
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn gate(&self, gate_id: &str) -> Option<&QualityGateResult> {
        self.gates.iter().find(|g| g.gate_id == gate_id)
    }
}
