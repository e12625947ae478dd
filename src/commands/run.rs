//! Plan execution command
//! Usage: weft run <plan> [--dry-run] [--json]

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::{prepare, print_gate_result, print_output_tail, status_indicator};
use crate::config::ConfigOverrides;
use crate::executor::CancelFlag;
use crate::models::{ExecutionReport, RunStatus, TaskStatus};
use crate::plan::schema::Plan;

pub struct RunOptions {
    pub plan_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    /// Print the report as JSON instead of a summary
    pub json: bool,
}

/// Execute the run command
pub fn execute(options: RunOptions, cancel: CancelFlag) -> Result<()> {
    let (parsed, engine) = prepare(
        &options.plan_path,
        options.config_path.as_deref(),
        &options.overrides,
        cancel,
    )?;
    let mut plan = parsed.plan;

    if !options.json {
        let mode = if engine.executor().config().dry_run {
            " (dry run)"
        } else {
            ""
        };
        println!(
            "{} Running plan '{}'{}...\n",
            "→".cyan().bold(),
            plan.metadata.name,
            mode
        );
    }

    let report = engine.run(&plan)?;
    plan.attach_results(&report.tasks);

    if options.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print_report(&plan, &report);
    }

    match report.status {
        RunStatus::Passed => Ok(()),
        RunStatus::Failed => bail!("Plan '{}' failed", report.plan_id),
        RunStatus::Cancelled => bail!("Plan '{}' was cancelled", report.plan_id),
    }
}

fn print_report(plan: &Plan, report: &ExecutionReport) {
    println!("{}", "Tasks:".bold());
    for task in &plan.tasks {
        let detail = match &task.result {
            Some(result) => {
                let mut line = format!("{}ms", result.duration.as_millis());
                if result.attempts > 1 {
                    line.push_str(&format!(", {} attempts", result.attempts));
                }
                if let Some(error) = &result.error {
                    line.push_str(&format!(", {error}"));
                }
                line
            }
            None => "not started".to_string(),
        };
        println!(
            "  {} {} {}",
            status_indicator(task.status),
            task.id,
            format!("({detail})").dimmed()
        );
        if let (TaskStatus::Failed, Some(result)) = (task.status, &task.result) {
            print_output_tail("stdout", &result.stdout);
            print_output_tail("stderr", &result.stderr);
        }
    }

    if !report.gates.is_empty() {
        println!("\n{}", "Quality gates:".bold());
        for gate in &report.gates {
            print_gate_result(gate);
        }
    }

    let summary = &report.summary;
    println!(
        "\n{} {} | tasks: {} completed, {} failed, {} skipped, {} not started | gates: {}/{} passed | {}ms",
        "Summary:".bold(),
        match report.status {
            RunStatus::Passed => "PASSED".green().bold(),
            RunStatus::Failed => "FAILED".red().bold(),
            RunStatus::Cancelled => "CANCELLED".yellow().bold(),
        },
        summary.completed_tasks,
        summary.failed_tasks,
        summary.skipped_tasks,
        summary.not_started_tasks,
        summary.passed_gates,
        summary.total_gates,
        report.duration.as_millis()
    );
}
