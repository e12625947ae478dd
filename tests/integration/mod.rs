//! Integration tests for weft plan execution
//!
//! These tests drive plans end to end through the public API: YAML text is
//! parsed, tasks run as real shell processes and gates are judged on their
//! output.

pub mod helpers;
pub mod plan_parsing;
pub mod quality_gates;
pub mod scenarios;
pub mod task_execution;
