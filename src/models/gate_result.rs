use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::TaskStatus;
use crate::plan::schema::GateKind;

/// Outcome of a single quality gate.
///
/// `passed` is decided from the task status, the exit code and the
/// kind-specific output heuristics, so it can be false with exit code 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGateResult {
    pub gate_id: String,
    pub kind: GateKind,
    pub required: bool,
    pub status: TaskStatus,
    pub passed: bool,
    #[serde(rename = "durationMs", with = "super::duration_ms")]
    pub duration: Duration,
    pub message: String,
    /// Exit code, attempts, output excerpts and gate settings
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl QualityGateResult {
    /// A failed gate that blocks progress
    pub fn is_blocking(&self) -> bool {
        self.required && !self.passed
    }
}
