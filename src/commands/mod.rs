//! CLI subcommands

pub mod gates;
pub mod graph;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigOverrides, EngineConfig};
use crate::engine::Engine;
use crate::executor::CancelFlag;
use crate::models::{QualityGateResult, TaskStatus};
use crate::plan::{parse_plan, ParsedPlan};

/// Lines of captured output shown under a failed task or gate
const OUTPUT_TAIL_LINES: usize = 20;

/// Parse a plan file, printing any warnings
pub(crate) fn load_plan(plan_path: &Path) -> Result<ParsedPlan> {
    let parsed = parse_plan(plan_path)
        .with_context(|| format!("Failed to parse plan: {}", plan_path.display()))?;

    for warning in &parsed.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(parsed)
}

/// Load the plan and build an engine from the discovered config plus overrides
pub(crate) fn prepare(
    plan_path: &Path,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    cancel: CancelFlag,
) -> Result<(ParsedPlan, Engine)> {
    let parsed = load_plan(plan_path)?;
    let config = EngineConfig::discover(config_path, Some(plan_path))
        .context("Failed to load engine config")?
        .apply_overrides(overrides)
        .context("Invalid engine config")?;

    let engine = Engine::from_config(&config, plan_dir(plan_path)).with_cancel_flag(cancel);
    Ok((parsed, engine))
}

/// Cancellation flag set by Ctrl-C
pub fn install_interrupt_handler() -> Result<CancelFlag> {
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n{} Interrupted, stopping running tasks...", "!".yellow().bold());
        handler_flag.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;
    Ok(cancel)
}

fn plan_dir(plan_path: &Path) -> Option<PathBuf> {
    plan_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn status_indicator(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Completed => "✓".green().bold(),
        TaskStatus::Failed => "✗".red().bold(),
        TaskStatus::Skipped => "−".yellow(),
        TaskStatus::Running => "●".blue().bold(),
        TaskStatus::Pending => "○".white().dimmed(),
    }
}

fn print_gate_result(result: &QualityGateResult) {
    let indicator = if result.passed {
        "✓".green().bold()
    } else if result.required {
        "✗".red().bold()
    } else {
        "!".yellow().bold()
    };
    let optional = if result.required { "" } else { " (optional)" };
    println!(
        "  {} {}{} {}",
        indicator,
        result.gate_id,
        optional.dimmed(),
        format!("- {} ({}ms)", result.message, result.duration.as_millis()).dimmed()
    );
    if !result.passed {
        for stream in ["stdout", "stderr"] {
            if let Some(output) = result.details.get(stream).and_then(|v| v.as_str()) {
                print_output_tail(stream, output);
            }
        }
    }
}

/// Print the last lines of a captured stream, dimmed and indented
fn print_output_tail(stream: &str, output: &str) {
    let output = output.trim_end();
    if output.is_empty() {
        return;
    }
    let lines: Vec<&str> = output.lines().collect();
    let hidden = lines.len().saturating_sub(OUTPUT_TAIL_LINES);

    println!("      {}", format!("{stream}:").dimmed());
    if hidden > 0 {
        println!("        {}", format!("... {hidden} earlier line(s)").dimmed());
    }
    for line in &lines[hidden..] {
        println!("        {}", line.dimmed());
    }
}
