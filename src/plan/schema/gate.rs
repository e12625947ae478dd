//! Quality gate configuration

use std::collections::BTreeMap;
use std::time::Duration;

use super::kinds::GateKind;

/// A quality gate as declared in a plan, derived from a task, or taken from
/// the default gate set
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGateConfig {
    pub id: String,
    pub name: String,
    pub kind: GateKind,
    /// A failing required gate halts the remaining gates
    pub required: bool,
    pub settings: GateSettings,
    /// Task wrapped by this gate instead of a synthesized command
    pub task_id: Option<String>,
}

/// Free-form gate configuration bag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GateSettings {
    pub command: Option<String>,
    pub timeout: Option<Duration>,
    /// Keys other than `command` and `timeout`, preserved verbatim
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl QualityGateConfig {
    /// Create a required gate with no explicit command or timeout
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: GateKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            required: true,
            settings: GateSettings::default(),
            task_id: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.settings.command = Some(command.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn for_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}
