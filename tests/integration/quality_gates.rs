//! Gate ordering, halting and output heuristics on real processes

use weft::executor::{ExecutorConfig, TaskExecutor};
use weft::gates::{default_gates, QualityGateRunner};
use weft::models::{RunStatus, TaskStatus};
use weft::plan::GateKind;
use weft::{Engine, GateSource};

use super::helpers::{gate_ids, plan, run};

fn runner() -> QualityGateRunner {
    QualityGateRunner::new(TaskExecutor::new(ExecutorConfig::default()))
}

#[test]
fn test_declared_gates_run_in_priority_order() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: ship, name: Ship, type: deploy, required: false, config: {command: "true"}}
  - {id: bundle, name: Bundle, type: build, config: {command: "true"}}
  - {id: style, name: Style, config: {command: "true"}}
  - {id: unit, name: Unit, type: test, config: {command: "echo '3 passing'"}}
  - {id: types, name: Types, type: type-check, config: {command: "true"}}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(gate_ids(&report), vec!["style", "types", "unit", "bundle", "ship"]);
    assert!(report.gates.iter().all(|g| g.passed));
    assert_eq!(report.status, RunStatus::Passed);
}

#[test]
fn test_optional_gate_failure_keeps_run_passing() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: e2e, name: E2E, type: integration, required: false, config: {command: "exit 1"}}
  - {id: deploy, name: Deploy, type: deploy, config: {command: "true"}}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(gate_ids(&report), vec!["e2e", "deploy"]);
    assert!(!report.gates[0].passed);
    assert!(report.gates[1].passed);
    assert_eq!(report.status, RunStatus::Passed);
    assert_eq!(report.summary.failed_gates, 1);
}

#[test]
fn test_gate_timeout_fails_gate() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: slow-lint, name: Slow lint, config: {command: "sleep 3", timeout: 0.2}}
"#,
        ExecutorConfig::default(),
    );

    let gate = &report.gates[0];
    assert!(!gate.passed);
    assert_eq!(gate.status, TaskStatus::Failed);
    assert_eq!(gate.details["timedOut"], true);
    assert_eq!(report.status, RunStatus::Failed);
}

#[test]
fn test_gate_config_extras_are_preserved() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: lint, name: Lint, config: {command: "true", fix: false, paths: [src]}}
"#,
        ExecutorConfig::default(),
    );

    let details = &report.gates[0].details;
    assert_eq!(details["config"]["fix"], false);
    assert_eq!(details["config"]["paths"][0], "src");
}

#[test]
fn test_derived_gates_wrap_their_tasks() {
    let plan = plan(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: prepare, name: Prepare, command: "true"}
  - {id: unit, name: Unit, type: test, command: "echo 'tests: 4 passed'", dependsOn: [prepare]}
"#,
    );

    let report = Engine::new(ExecutorConfig::default())
        .with_gate_source(GateSource::Derived)
        .run(&plan)
        .unwrap();

    assert_eq!(gate_ids(&report), vec!["unit-gate"]);
    assert!(report.gates[0].passed);
    assert_eq!(report.gates[0].details["command"], "echo 'tests: 4 passed'");
}

#[test]
fn test_default_gates_in_dry_run() {
    let results = QualityGateRunner::new(TaskExecutor::new(
        ExecutorConfig::default().with_dry_run(true),
    ))
    .execute_gates(&default_gates());

    let kinds: Vec<GateKind> = results.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, GateKind::ALL.to_vec());
    assert!(results.iter().all(|r| r.passed && r.details["simulated"] == true));
}

#[test]
fn test_build_errors_in_output_fail_the_gate() {
    let gates = weft::plan::parse(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
qualityGates:
  - {id: build, name: Build, type: build, config: {command: "echo 'Build failed: missing module'"}}
"#,
    )
    .unwrap()
    .quality_gates;

    let result = runner().execute_gate(&gates[0]);

    assert_eq!(result.status, TaskStatus::Completed);
    assert!(!result.passed);
    assert!(result.is_blocking());
}
