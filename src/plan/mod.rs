//! Plan parsing and schema validation
//!
//! This module handles:
//! - Decoding plan documents (YAML) into the typed plan model
//! - Validating tasks, quality gates and the dependency graph
//! - Building execution graphs for the scheduler

pub mod graph;
pub mod parser;
pub mod schema;

pub use graph::{ExecutionGraph, TaskNode};
pub use parser::{parse, parse_plan, parse_plan_content, ParsedPlan};
pub use schema::{
    AgentInput, AgentKind, ExecutionStrategy, GateKind, GateSettings, Plan, PlanMetadata,
    QualityGateConfig, RetryPolicy, Task, TaskAction, TaskKind, ValidationError,
    ValidationErrorKind, ValidationWarning,
};
