//! Dependency graph display
//! Usage: weft graph <plan>

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::load_plan;
use crate::plan::graph::ExecutionGraph;

/// Print the plan's tasks grouped into layers. Tasks in the same layer
/// have no dependency on each other and may run in parallel.
pub fn execute(plan_path: &Path) -> Result<()> {
    let parsed = load_plan(plan_path)?;
    let tasks = &parsed.plan.tasks;
    let graph = ExecutionGraph::build(tasks)?;

    if graph.is_empty() {
        println!("{}", "Plan has no tasks".dimmed());
        return Ok(());
    }

    println!("{}", format!("Execution graph: {}", parsed.plan.metadata.name).bold());
    for (level, layer) in graph.layers().iter().enumerate() {
        println!("\n{}", format!("Layer {level}").cyan().bold());
        for &index in layer {
            let task = &tasks[index];
            let deps = graph.ids(graph.dependencies(index));
            let after = if deps.is_empty() {
                String::new()
            } else {
                format!(" ← {}", deps.join(", "))
            };
            println!(
                "  {} {}{}",
                task.id,
                format!("[{}]", task.kind_label()).dimmed(),
                after.dimmed()
            );
        }
    }

    let order = graph.ids(&graph.topological_order()).join(" → ");
    println!("\n{} {}", "Order:".bold(), order);
    Ok(())
}
