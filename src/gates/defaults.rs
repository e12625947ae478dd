//! Default commands and timeouts per gate kind, and the baseline gate sets

use std::time::Duration;

use crate::plan::schema::{GateKind, QualityGateConfig, Task};

/// Command run by a gate that does not configure one
pub fn default_command(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Lint => "npm run lint",
        GateKind::TypeCheck => "npm run typecheck",
        GateKind::Test => "npm test",
        GateKind::Build => "npm run build",
        GateKind::Integration => "npm run test:integration",
        GateKind::Deploy => "npm run deploy",
    }
}

/// Timeout for a gate that does not configure one
pub fn default_timeout(kind: GateKind) -> Duration {
    let secs = match kind {
        GateKind::Lint => 60,
        GateKind::TypeCheck => 120,
        GateKind::Test | GateKind::Build => 300,
        GateKind::Integration => 600,
        GateKind::Deploy => 900,
    };
    Duration::from_secs(secs)
}

/// Baseline gate set: lint, type-check, tests and build are required;
/// integration and deploy are optional
pub fn default_gates() -> Vec<QualityGateConfig> {
    GateKind::ALL
        .iter()
        .map(|&kind| {
            let required = !matches!(kind, GateKind::Integration | GateKind::Deploy);
            QualityGateConfig::new(kind.as_str(), kind.label(), kind)
                .with_required(required)
                .with_command(default_command(kind))
                .with_timeout(default_timeout(kind))
        })
        .collect()
}

/// One required gate per command task whose kind is a gate kind
pub fn gates_from_tasks(tasks: &[Task]) -> Vec<QualityGateConfig> {
    tasks
        .iter()
        .filter_map(|task| {
            let kind = task.gate_kind()?;
            Some(
                QualityGateConfig::new(format!("{}-gate", task.id), task.name.clone(), kind)
                    .for_task(task.id.clone()),
            )
        })
        .collect()
}
