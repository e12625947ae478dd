//! Plan schema definitions

mod diagnostics;
mod gate;
mod kinds;
mod types;

#[cfg(test)]
mod tests;

pub use diagnostics::{ValidationError, ValidationErrorKind, ValidationWarning};
pub use gate::{GateSettings, QualityGateConfig};
pub use kinds::{AgentKind, ExecutionStrategy, GateKind, TaskKind};
pub use types::{AgentInput, Plan, PlanMetadata, RetryPolicy, Task, TaskAction};
