//! Run only the quality gates of a plan
//! Usage: weft gates <plan> [--source derived]

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::{prepare, print_gate_result};
use crate::config::ConfigOverrides;
use crate::executor::CancelFlag;
use crate::gates::{execution_order, QualityGateRunner};

pub struct GatesOptions {
    pub plan_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    /// Only list the gates in execution order
    pub list: bool,
    pub json: bool,
}

/// Execute the gates command
pub fn execute(options: GatesOptions, cancel: CancelFlag) -> Result<()> {
    let (parsed, engine) = prepare(
        &options.plan_path,
        options.config_path.as_deref(),
        &options.overrides,
        cancel,
    )?;
    let gates = engine.gates_for(&parsed.plan);

    if gates.is_empty() {
        println!("{}", "No quality gates to run".dimmed());
        return Ok(());
    }

    if options.list {
        for gate in execution_order(&gates) {
            let required = if gate.required { "required" } else { "optional" };
            println!(
                "  {} {} {}",
                gate.id,
                format!("[{}]", gate.kind).dimmed(),
                required.dimmed()
            );
        }
        return Ok(());
    }

    let results = QualityGateRunner::new(engine.executor().clone())
        .with_tasks(&parsed.plan.tasks)
        .execute_gates(&gates);

    if options.json {
        let json =
            serde_json::to_string_pretty(&results).context("Failed to serialize gate results")?;
        println!("{json}");
    } else {
        println!("{}", "Quality gates:".bold());
        for result in &results {
            print_gate_result(result);
        }
        let not_run = gates.len() - results.len();
        if not_run > 0 {
            println!("  {} {} gate(s) not run", "−".dimmed(), not_run);
        }
    }

    if let Some(blocking) = results.iter().find(|r| r.is_blocking()) {
        bail!("Required gate '{}' failed", blocking.gate_id);
    }
    if engine.executor().cancel_flag().is_cancelled() {
        bail!("Gate run was cancelled");
    }
    Ok(())
}
