//! End-to-end scenarios for complete plans

use std::fs;

use tempfile::TempDir;

use weft::executor::{ExecutorConfig, DRY_RUN_MARKER};
use weft::models::{RunStatus, TaskStatus};

use super::helpers::{gate_ids, marker, run, task, task_ids};

#[test]
fn test_linear_chain_with_passing_gates() {
    let report = run(
        r#"
metadata: {id: release, name: Release, version: 1.0.0}
tasks:
  - {id: setup, name: Setup, command: "true"}
  - {id: build, name: Build, type: build, command: "true", dependsOn: [setup]}
  - {id: test, name: Test, type: test, command: "true", dependsOn: [build]}
qualityGates:
  - {id: lint, name: Lint, type: lint, config: {command: "true"}}
  - {id: tests, name: Tests, type: test, config: {command: "true"}}
  - {id: build, name: Build, type: build, config: {command: "true"}}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(report.status, RunStatus::Passed);
    assert!(report.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert_eq!(gate_ids(&report), vec!["lint", "tests", "build"]);
    assert!(report.gates.iter().all(|g| g.passed));

    let setup = task(&report, "setup");
    let build = task(&report, "build");
    let test = task(&report, "test");
    assert!(setup.start_time < build.start_time);
    assert!(build.start_time < test.start_time);
}

#[test]
fn test_failing_task_halts_under_default_policy() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: failing-task, name: Failing, command: "exit 1"}
  - {id: dependent-task, name: Dependent, command: "true", dependsOn: [failing-task]}
  - {id: independent-task, name: Independent, command: "true"}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(task_ids(&report), vec!["failing-task"]);
    assert_eq!(report.tasks[0].status, TaskStatus::Failed);
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.summary.not_started_tasks, 2);
}

#[test]
fn test_required_gate_failure_stops_later_gates() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: passing, name: Passing, type: lint, config: {command: "true"}}
  - {id: failing, name: Failing, type: test, config: {command: "exit 1"}}
  - {id: subsequent, name: Subsequent, type: build, required: false, config: {command: "true"}}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(report.gates.len(), 2);
    assert_eq!(gate_ids(&report), vec!["passing", "failing"]);
    assert_eq!(report.status, RunStatus::Failed);
}

#[test]
fn test_lint_warnings_fail_despite_zero_exit() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: lint, name: Lint, config: {command: "echo '2 warnings found'"}}
"#,
        ExecutorConfig::default(),
    );

    let gate = &report.gates[0];
    assert_eq!(gate.details["exitCode"], 0);
    assert!(!gate.passed);
    assert_eq!(report.status, RunStatus::Failed);
}

#[test]
fn test_dry_run_spawns_nothing_and_keeps_order() {
    let dir = TempDir::new().unwrap();
    let touched = marker(dir.path(), "touched");
    let yaml = format!(
        r#"
metadata: {{id: p, name: P, version: 1.0.0}}
tasks:
  - {{id: deploy, name: Deploy, command: "touch {touched}", dependsOn: [build]}}
  - {{id: build, name: Build, command: "touch {touched}"}}
qualityGates:
  - {{id: lint, name: Lint, config: {{command: "touch {touched}"}}}}
"#
    );

    let report = run(&yaml, ExecutorConfig::default().with_dry_run(true));

    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    assert!(report.dry_run);
    assert_eq!(task_ids(&report), vec!["build", "deploy"]);
    assert!(report.tasks.iter().all(|t| t.simulated && t.stdout.starts_with(DRY_RUN_MARKER)));
    assert!(task(&report, "build").start_time <= task(&report, "deploy").start_time);
    assert!(report.gates[0].passed);
    assert_eq!(report.gates[0].details["simulated"], true);
}
