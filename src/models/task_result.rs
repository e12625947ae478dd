use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status of a task in the execution lifecycle.
///
/// State machine transitions:
/// - `Pending` -> `Running` (when the scheduler starts the task)
/// - `Pending` -> `Skipped` (when a dependency did not complete)
/// - `Running` -> `Completed` | `Failed`
///
/// `Completed`, `Failed` and `Skipped` are terminal. Only `Completed`
/// satisfies a dependency. `Running` lives in the scheduler's bookkeeping
/// while a task is in flight; a `TaskResult` always carries a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of running (or skipping) a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "durationMs", with = "super::duration_ms")]
    pub duration: Duration,
    /// Number of process attempts made (0 for skipped tasks)
    pub attempts: u32,
    /// Whether the final attempt was killed by its timeout
    pub timed_out: bool,
    /// Whether the result was synthesized by a dry run
    pub simulated: bool,
    pub error: Option<String>,
}

impl TaskResult {
    /// Result for a task that was never started
    pub fn skipped(task_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Skipped,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            attempts: 0,
            timed_out: false,
            simulated: false,
            error: Some(reason.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    /// stdout followed by stderr, for output scanning
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        let status = if self.timed_out {
            "TIMEOUT".to_string()
        } else {
            self.status.to_string().to_uppercase()
        };
        let mut line = format!(
            "{} - {} ({}ms, exit code: {:?}",
            status,
            self.task_id,
            self.duration.as_millis(),
            self.exit_code
        );
        if self.attempts > 1 {
            line.push_str(&format!(", attempts: {}", self.attempts));
        }
        line.push(')');
        if self.simulated {
            line.push_str(" [dry run]");
        }
        line
    }
}
