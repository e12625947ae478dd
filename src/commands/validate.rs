//! Plan validation without execution
//! Usage: weft validate <plan>

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::load_plan;

/// Execute the validate command
pub fn execute(plan_path: &Path) -> Result<()> {
    let parsed = load_plan(plan_path)?;
    let plan = &parsed.plan;

    println!(
        "{} Plan '{}' v{} is valid: {} task(s), {} quality gate(s)",
        "✓".green().bold(),
        plan.metadata.id,
        plan.metadata.version,
        plan.tasks.len(),
        plan.quality_gates.len()
    );
    if !parsed.warnings.is_empty() {
        println!("  {} warning(s)", parsed.warnings.len().to_string().yellow());
    }
    Ok(())
}
