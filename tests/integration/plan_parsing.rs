//! Plan loading and validation through the public API

use weft::plan::{parse_plan, ValidationErrorKind};
use weft::{parse, parse_plan_content, PlanError};

use super::helpers::write_plan;

const PIPELINE: &str = r#"
metadata:
  id: pipeline
  name: Pipeline
  version: 2.0.0
tasks:
  - id: setup
    name: Setup
    command: "true"
  - id: build
    name: Build
    type: build
    command: "true"
    dependsOn: [setup]
  - id: test
    name: Test
    type: test
    command: "true"
    dependsOn: [build]
qualityGates:
  - id: lint
    name: Lint
    config:
      command: "true"
"#;

fn error_kinds(yaml: &str) -> Vec<ValidationErrorKind> {
    match parse(yaml) {
        Err(PlanError::Validation(errors)) => errors.into_iter().map(|e| e.kind).collect(),
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn test_parsing_is_deterministic() {
    assert_eq!(parse(PIPELINE).unwrap(), parse(PIPELINE).unwrap());
}

#[test]
fn test_parse_plan_reads_file_and_keeps_path() {
    let (_dir, path) = write_plan(PIPELINE);

    let parsed = parse_plan(&path).unwrap();

    assert_eq!(parsed.plan.metadata.id, "pipeline");
    assert_eq!(parsed.plan.tasks.len(), 3);
    assert_eq!(parsed.source_path.as_deref(), Some(path.as_path()));
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_mutual_dependency_is_a_cycle() {
    let kinds = error_kinds(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: a, name: A, command: "true", dependsOn: [b]}
  - {id: b, name: B, command: "true", dependsOn: [a]}
"#,
    );
    assert_eq!(kinds, vec![ValidationErrorKind::CircularDependency]);
}

#[test]
fn test_unknown_dependency_is_reported_not_raised() {
    let kinds = error_kinds(
        r#"
metadata: {id: p, name: P, version: 1.0.0}
tasks:
  - {id: a, name: A, command: "true", dependsOn: [missing]}
"#,
    );
    assert_eq!(kinds, vec![ValidationErrorKind::UnknownDependency]);
}

#[test]
fn test_errors_are_aggregated_across_sections() {
    let kinds = error_kinds(
        r#"
metadata: {id: p, version: 1.0.0}
tasks:
  - {id: a, name: A}
  - {id: a, name: Again, command: "true", timeout: -1}
qualityGates:
  - {id: g, name: G, type: fuzz}
"#,
    );

    assert!(kinds.contains(&ValidationErrorKind::MissingField));
    assert!(kinds.contains(&ValidationErrorKind::DuplicateId));
    assert!(kinds.contains(&ValidationErrorKind::OutOfRange));
    assert!(kinds.contains(&ValidationErrorKind::WrongType));
    assert!(kinds.len() >= 5);
}

#[test]
fn test_syntax_errors_are_fatal() {
    let err = parse("metadata: [unclosed").unwrap_err();
    assert!(matches!(err, PlanError::Syntax(_)));
}

#[test]
fn test_warnings_do_not_block_parsing() {
    let parsed = parse_plan_content(
        r#"
metadata: {id: p, name: P, version: latest}
tasks:
  - id: research
    name: Research
    type: research
    input: {type: discovery, context: {}}
    strategy: adaptive
"#,
    )
    .unwrap();

    let paths: Vec<&str> = parsed.warnings.iter().map(|w| w.path.as_str()).collect();
    assert_eq!(paths, vec!["metadata.version", "tasks[0]"]);
    assert!(parsed.plan.tasks[0].is_agent_task());
}
