//! Plan execution: tasks in dependency order, then quality gates

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::PlanError;
use crate::executor::{AgentDispatcher, CancelFlag, ExecutorConfig, TaskExecutor};
use crate::gates::{default_gates, gates_from_tasks, QualityGateRunner};
use crate::models::ExecutionReport;
use crate::plan::schema::{Plan, QualityGateConfig};

/// Where the gates of a run come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GateSource {
    /// Gates declared in the plan's `qualityGates`
    #[default]
    Plan,
    /// One required gate per task whose kind is a gate kind
    Derived,
    /// The built-in lint/type-check/test/build/integration/deploy set
    Default,
    /// No gates
    None,
}

impl fmt::Display for GateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateSource::Plan => "plan",
            GateSource::Derived => "derived",
            GateSource::Default => "default",
            GateSource::None => "none",
        };
        write!(f, "{name}")
    }
}

pub struct Engine {
    executor: TaskExecutor,
    gate_source: GateSource,
    run_gates_after_failure: bool,
}

impl Engine {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            executor: TaskExecutor::new(config),
            gate_source: GateSource::default(),
            run_gates_after_failure: false,
        }
    }

    /// Engine for an already validated config. `base_dir` is the plan's directory.
    pub fn from_config(config: &EngineConfig, base_dir: Option<PathBuf>) -> Self {
        Self::new(config.executor_config(base_dir))
            .with_gate_source(config.gates)
            .with_run_gates_after_failure(config.run_gates_after_failure)
    }

    pub fn with_gate_source(mut self, source: GateSource) -> Self {
        self.gate_source = source;
        self
    }

    pub fn with_run_gates_after_failure(mut self, enabled: bool) -> Self {
        self.run_gates_after_failure = enabled;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.executor = self.executor.with_cancel_flag(cancel);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AgentDispatcher>) -> Self {
        self.executor = self.executor.with_dispatcher(dispatcher);
        self
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    /// Gates this engine would run for `plan`
    pub fn gates_for(&self, plan: &Plan) -> Vec<QualityGateConfig> {
        match self.gate_source {
            GateSource::Plan => plan.quality_gates.clone(),
            GateSource::Derived => gates_from_tasks(&plan.tasks),
            GateSource::Default => default_gates(),
            GateSource::None => Vec::new(),
        }
    }

    /// Execute all tasks, then the gates, and aggregate a report.
    ///
    /// Gates are not run when the run was cancelled, or when a task failed
    /// unless `run_gates_after_failure` is set.
    pub fn run(&self, plan: &Plan) -> Result<ExecutionReport, PlanError> {
        let start_time = Utc::now();
        info!(plan = %plan.metadata.id, gates = %self.gate_source, "starting run");

        let tasks = self.executor.execute(plan)?;
        let cancel = self.executor.cancel_flag();
        let task_failed = tasks.iter().any(|t| t.is_failed());

        let gates = if cancel.is_cancelled() {
            warn!("run cancelled, skipping quality gates");
            Vec::new()
        } else if task_failed && !self.run_gates_after_failure {
            info!("a task failed, skipping quality gates");
            Vec::new()
        } else {
            QualityGateRunner::new(self.executor.clone())
                .with_tasks(&plan.tasks)
                .execute_gates(&self.gates_for(plan))
        };

        let report = ExecutionReport::new(
            &plan.metadata.id,
            plan.tasks.len(),
            start_time,
            tasks,
            gates,
            cancel.is_cancelled(),
        )
        .with_dry_run(self.executor.config().dry_run);

        info!(
            plan = %report.plan_id,
            status = %report.status,
            duration_ms = report.duration.as_millis() as u64,
            "run finished"
        );
        Ok(report)
    }
}
