//! Task scheduling, retries, timeouts and cancellation on real processes

use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;
use tempfile::TempDir;

use weft::executor::{CancelFlag, ExecutorConfig, TaskExecutor};
use weft::models::{RunStatus, TaskStatus};
use weft::Engine;

use super::helpers::{marker, plan, run, task, task_ids};

#[test]
fn test_start_never_precedes_dependency_end() {
    let report = run(
        r#"
metadata: {id: diamond, name: Diamond, version: 1.0.0}
tasks:
  - {id: root, name: Root, command: "sleep 0.1"}
  - {id: left, name: Left, command: "sleep 0.1", dependsOn: [root]}
  - {id: right, name: Right, command: "sleep 0.1", dependsOn: [root]}
  - {id: join, name: Join, command: "true", dependsOn: [left, right]}
"#,
        ExecutorConfig::default().with_max_parallel(4),
    );

    assert_eq!(report.status, RunStatus::Passed);
    let edges = [
        ("left", "root"),
        ("right", "root"),
        ("join", "left"),
        ("join", "right"),
    ];
    for (dependent, dependency) in edges {
        assert!(
            task(&report, dependency).end_time <= task(&report, dependent).start_time,
            "{dependent} started before {dependency} finished"
        );
    }
}

#[test]
fn test_declaration_order_breaks_ties() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: zeta, name: Z, command: "true"}
  - {id: alpha, name: A, command: "true"}
  - {id: mid, name: M, command: "true"}
"#,
        ExecutorConfig::default(),
    );

    assert_eq!(task_ids(&report), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_continue_on_error_runs_independent_work() {
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: failing-task, name: F, command: "exit 1"}
  - {id: dependent-task, name: D, command: "true", dependsOn: [failing-task]}
  - {id: independent-task, name: I, command: "true"}
"#,
        ExecutorConfig::default().with_continue_on_error(true),
    );

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(task(&report, "failing-task").status, TaskStatus::Failed);
    assert_eq!(task(&report, "dependent-task").status, TaskStatus::Skipped);
    assert_eq!(task(&report, "dependent-task").attempts, 0);
    assert_eq!(task(&report, "independent-task").status, TaskStatus::Completed);
    assert_eq!(report.summary.skipped_tasks, 1);
}

#[test]
fn test_retry_policy_with_backoff() {
    let dir = TempDir::new().unwrap();
    let counter = marker(dir.path(), "attempts");
    let yaml = format!(
        r#"
metadata: {{id: p, name: P, version: 1.0.0}}
tasks:
  - id: flaky
    name: Flaky
    command: "echo x >> {counter}; [ $(wc -l < {counter}) -ge 2 ]"
    retry:
      maxAttempts: 3
      delay: 0.05
      backoffMultiplier: 2
"#
    );

    let report = run(&yaml, ExecutorConfig::default());

    let flaky = task(&report, "flaky");
    assert_eq!(flaky.status, TaskStatus::Completed);
    assert_eq!(flaky.attempts, 2);
    assert_eq!(fs::read_to_string(dir.path().join("attempts")).unwrap().lines().count(), 2);
}

#[test]
fn test_working_dir_is_relative_to_base_dir() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("web")).unwrap();
    let report = run(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: where, name: Where, command: "touch here", workingDir: web}
"#,
        ExecutorConfig::default().with_base_dir(dir.path()),
    );

    assert!(report.is_success());
    assert!(dir.path().join("web/here").exists());
}

#[test]
#[serial]
fn test_timeout_kills_the_whole_process_group() {
    let dir = TempDir::new().unwrap();
    let late = marker(dir.path(), "late");
    let yaml = format!(
        r#"
metadata: {{id: p, name: P, version: 1.0.0}}
tasks:
  - id: slow
    name: Slow
    command: "(sleep 1; touch {late}) & wait"
    timeout: 0.2
"#
    );

    let started = Instant::now();
    let report = run(&yaml, ExecutorConfig::default());

    let slow = task(&report, "slow");
    assert!(slow.timed_out);
    assert_eq!(slow.status, TaskStatus::Failed);
    assert!(started.elapsed() < Duration::from_millis(900));

    thread::sleep(Duration::from_millis(1300));
    assert!(!dir.path().join("late").exists(), "grandchild outlived the timeout");
}

#[test]
#[serial]
fn test_cancellation_stops_running_and_pending_tasks() {
    let plan = plan(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: long, name: Long, command: "sleep 5"}
  - {id: after, name: After, command: "true", dependsOn: [long]}
"#,
    );
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });

    let started = Instant::now();
    let report = Engine::new(ExecutorConfig::default())
        .with_cancel_flag(cancel)
        .run(&plan)
        .unwrap();
    canceller.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(task_ids(&report), vec!["long"]);
    assert_eq!(task(&report, "long").error.as_deref(), Some("run cancelled"));
    assert_eq!(report.summary.not_started_tasks, 1);
}

#[test]
fn test_executor_can_run_a_single_task() {
    let plan = plan(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: greet, name: Greet, command: "echo \"hello $WHO\"", env: {WHO: weft}}
"#,
    );

    let result = TaskExecutor::new(ExecutorConfig::default()).run_task(&plan.tasks[0]);

    assert_eq!(result.stdout.trim(), "hello weft");
    assert_eq!(result.exit_code, Some(0));
}
