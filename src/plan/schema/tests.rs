//! Tests for plan schema types

use std::collections::BTreeMap;
use std::time::Duration;

use super::*;
use crate::models::{TaskResult, TaskStatus};

fn create_plan() -> Plan {
    Plan::new(PlanMetadata::new("plan-1", "Plan One", "1.0.0"))
        .with_task(Task::command("setup", "Setup", "echo setup"))
        .with_task(
            Task::command("build", "Build", "cargo build")
                .of_kind(TaskKind::Build)
                .depends_on(["setup"]),
        )
}

#[test]
fn test_task_kind_aliases() {
    assert_eq!(TaskKind::parse("shell"), Some(TaskKind::Command));
    assert_eq!(TaskKind::parse("typecheck"), Some(TaskKind::TypeCheck));
    assert_eq!(TaskKind::parse("type_check"), Some(TaskKind::TypeCheck));
    assert_eq!(TaskKind::parse(" Tests "), Some(TaskKind::Test));
    assert_eq!(TaskKind::parse("research"), None);
}

#[test]
fn test_agent_kinds_are_disjoint_from_task_kinds() {
    for tag in ["agent", "research", "analysis", "review"] {
        assert!(AgentKind::parse(tag).is_some(), "{tag} should be an agent kind");
        assert!(TaskKind::parse(tag).is_none(), "{tag} should not be a task kind");
    }
}

#[test]
fn test_gate_kind_rejects_generic_command() {
    assert_eq!(GateKind::parse("command"), None);
    assert_eq!(GateKind::parse("deploy"), Some(GateKind::Deploy));
}

#[test]
fn test_gate_priority_matches_declaration_order() {
    let mut kinds = vec![
        GateKind::Deploy,
        GateKind::Test,
        GateKind::Lint,
        GateKind::Integration,
        GateKind::Build,
        GateKind::TypeCheck,
    ];
    kinds.sort();
    assert_eq!(kinds, GateKind::ALL.to_vec());

    let priorities: Vec<u8> = GateKind::ALL.iter().map(|k| k.priority()).collect();
    assert_eq!(priorities, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_gate_kind_labels() {
    assert_eq!(GateKind::TypeCheck.as_str(), "type-check");
    assert_eq!(GateKind::TypeCheck.label(), "Type check");
    assert_eq!(GateKind::Test.to_string(), "test");
}

#[test]
fn test_retry_delay_without_backoff_is_constant() {
    let retry = RetryPolicy::new(4, Duration::from_millis(200));
    assert_eq!(retry.delay_before_retry(1), Duration::from_millis(200));
    assert_eq!(retry.delay_before_retry(3), Duration::from_millis(200));
}

#[test]
fn test_retry_delay_with_backoff_grows() {
    let retry = RetryPolicy::new(4, Duration::from_secs(1)).with_backoff(2.0);
    assert_eq!(retry.delay_before_retry(1), Duration::from_secs(1));
    assert_eq!(retry.delay_before_retry(2), Duration::from_secs(2));
    assert_eq!(retry.delay_before_retry(3), Duration::from_secs(4));
}

#[test]
fn test_retry_delay_saturates() {
    let retry = RetryPolicy::new(u32::MAX, Duration::from_secs(60)).with_backoff(1e300);
    assert_eq!(retry.delay_before_retry(5), Duration::MAX);
}

#[test]
fn test_task_builders() {
    let task = Task::command("test", "Run tests", "cargo test")
        .of_kind(TaskKind::Test)
        .depends_on(["build", "setup"])
        .with_timeout(Duration::from_secs(30))
        .with_env("RUST_BACKTRACE", "1")
        .with_working_dir("crates/core");

    assert_eq!(task.command_line(), Some("cargo test"));
    assert_eq!(task.gate_kind(), Some(GateKind::Test));
    assert_eq!(task.kind_label(), "test");
    assert_eq!(task.depends_on, vec!["build", "setup"]);
    assert_eq!(task.timeout, Some(Duration::from_secs(30)));
    assert_eq!(task.env.get("RUST_BACKTRACE").map(String::as_str), Some("1"));
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(!task.is_agent_task());
}

#[test]
fn test_agent_task_has_no_command() {
    let input = AgentInput {
        kind: "codebase-analysis".to_string(),
        context: BTreeMap::new(),
    };
    let task = Task::agent(
        "scan",
        "Scan",
        AgentKind::Analysis,
        input,
        ExecutionStrategy::Parallel,
    )
    .of_kind(TaskKind::Lint);

    assert!(task.is_agent_task());
    assert_eq!(task.command_line(), None);
    assert_eq!(task.gate_kind(), None);
    assert_eq!(task.kind_label(), "analysis");
}

#[test]
fn test_attach_results_leaves_unattempted_tasks_pending() {
    let mut plan = create_plan();
    let mut result = TaskResult::skipped("setup", "");
    result.status = TaskStatus::Completed;
    result.error = None;

    plan.attach_results(&[result]);

    let setup = plan.task("setup").unwrap();
    assert_eq!(setup.status, TaskStatus::Completed);
    assert!(setup.result.is_some());

    let build = plan.task("build").unwrap();
    assert_eq!(build.status, TaskStatus::Pending);
    assert!(build.result.is_none());
}

#[test]
fn test_gate_builders() {
    let gate = QualityGateConfig::new("deploy", "Deploy", GateKind::Deploy)
        .optional()
        .with_command("./deploy.sh")
        .with_timeout(Duration::from_secs(900))
        .for_task("release");

    assert!(!gate.required);
    assert_eq!(gate.settings.command.as_deref(), Some("./deploy.sh"));
    assert_eq!(gate.settings.timeout, Some(Duration::from_secs(900)));
    assert_eq!(gate.task_id.as_deref(), Some("release"));
    assert!(QualityGateConfig::new("lint", "Lint", GateKind::Lint).required);
}

#[test]
fn test_validation_error_display() {
    let err = ValidationError::new(
        ValidationErrorKind::OutOfRange,
        "tasks[0].timeout",
        "must be greater than 0",
    );
    assert_eq!(err.to_string(), "tasks[0].timeout: must be greater than 0");
    assert_eq!(ValidationErrorKind::CircularDependency.to_string(), "CircularDependency");
}
