//! Shared helpers for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use weft::executor::ExecutorConfig;
use weft::models::{ExecutionReport, TaskResult};
use weft::{parse, Engine, GateSource, Plan};

/// Parse plan text that is expected to be valid
pub fn plan(yaml: &str) -> Plan {
    parse(yaml).unwrap_or_else(|e| panic!("plan should be valid: {e}"))
}

/// Run a plan with the given executor settings and the plan's own gates
pub fn run(yaml: &str, config: ExecutorConfig) -> ExecutionReport {
    Engine::new(config)
        .with_gate_source(GateSource::Plan)
        .run(&plan(yaml))
        .expect("parsed plans always build a valid graph")
}

/// Write plan text into a fresh temporary directory
pub fn write_plan(yaml: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("plan.yaml");
    fs::write(&path, yaml).expect("Failed to write plan");
    (dir, path)
}

pub fn task<'a>(report: &'a ExecutionReport, id: &str) -> &'a TaskResult {
    report
        .task(id)
        .unwrap_or_else(|| panic!("no result for task '{id}'"))
}

pub fn task_ids(report: &ExecutionReport) -> Vec<&str> {
    report.tasks.iter().map(|t| t.task_id.as_str()).collect()
}

pub fn gate_ids(report: &ExecutionReport) -> Vec<&str> {
    report.gates.iter().map(|g| g.gate_id.as_str()).collect()
}

/// Path used by plans that record side effects in a file
pub fn marker(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}
