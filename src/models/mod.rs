//! Runtime records produced by execution

mod duration_ms;
mod gate_result;
mod report;
mod task_result;

pub use gate_result::QualityGateResult;
pub use report::{ExecutionReport, ReportSummary, RunStatus};
pub use task_result::{TaskResult, TaskStatus};
