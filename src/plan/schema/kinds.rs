//! Task, agent and gate kind enumerations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a command task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Plain shell command with no gate semantics
    #[default]
    Command,
    Lint,
    TypeCheck,
    Test,
    Build,
    Integration,
    Deploy,
}

impl TaskKind {
    /// Parse a kind tag as written in a plan document
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "command" | "shell" | "generic" => Some(TaskKind::Command),
            "lint" => Some(TaskKind::Lint),
            "type-check" | "typecheck" | "type_check" => Some(TaskKind::TypeCheck),
            "test" | "tests" => Some(TaskKind::Test),
            "build" => Some(TaskKind::Build),
            "integration" => Some(TaskKind::Integration),
            "deploy" => Some(TaskKind::Deploy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Command => "command",
            TaskKind::Lint => "lint",
            TaskKind::TypeCheck => "type-check",
            TaskKind::Test => "test",
            TaskKind::Build => "build",
            TaskKind::Integration => "integration",
            TaskKind::Deploy => "deploy",
        }
    }

    /// The gate kind a task of this kind can be promoted to
    pub fn gate_kind(&self) -> Option<GateKind> {
        match self {
            TaskKind::Command => None,
            TaskKind::Lint => Some(GateKind::Lint),
            TaskKind::TypeCheck => Some(GateKind::TypeCheck),
            TaskKind::Test => Some(GateKind::Test),
            TaskKind::Build => Some(GateKind::Build),
            TaskKind::Integration => Some(GateKind::Integration),
            TaskKind::Deploy => Some(GateKind::Deploy),
        }
    }
}

impl From<GateKind> for TaskKind {
    fn from(kind: GateKind) -> Self {
        match kind {
            GateKind::Lint => TaskKind::Lint,
            GateKind::TypeCheck => TaskKind::TypeCheck,
            GateKind::Test => TaskKind::Test,
            GateKind::Build => TaskKind::Build,
            GateKind::Integration => TaskKind::Integration,
            GateKind::Deploy => TaskKind::Deploy,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of an agent task. Agent tasks carry a structured input instead of a
/// command and are handed to an external dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Agent,
    Research,
    Analysis,
    Review,
}

impl AgentKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "agent" => Some(AgentKind::Agent),
            "research" => Some(AgentKind::Research),
            "analysis" => Some(AgentKind::Analysis),
            "review" => Some(AgentKind::Review),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Agent => "agent",
            AgentKind::Research => "research",
            AgentKind::Analysis => "analysis",
            AgentKind::Review => "review",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an agent task should be carried out by its dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStrategy {
    Sequential,
    Parallel,
    Adaptive,
}

impl ExecutionStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sequential" => Some(ExecutionStrategy::Sequential),
            "parallel" => Some(ExecutionStrategy::Parallel),
            "adaptive" => Some(ExecutionStrategy::Adaptive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Parallel => "parallel",
            ExecutionStrategy::Adaptive => "adaptive",
        }
    }
}

/// Kind of a quality gate.
///
/// Variant order is the fixed execution priority: lint runs first, deploy last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateKind {
    Lint,
    TypeCheck,
    Test,
    Build,
    Integration,
    Deploy,
}

impl GateKind {
    /// Every gate kind, in execution priority order
    pub const ALL: [GateKind; 6] = [
        GateKind::Lint,
        GateKind::TypeCheck,
        GateKind::Test,
        GateKind::Build,
        GateKind::Integration,
        GateKind::Deploy,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        TaskKind::parse(value).and_then(|kind| kind.gate_kind())
    }

    /// Position in the fixed execution order (0 runs first)
    pub fn priority(&self) -> u8 {
        match self {
            GateKind::Lint => 0,
            GateKind::TypeCheck => 1,
            GateKind::Test => 2,
            GateKind::Build => 3,
            GateKind::Integration => 4,
            GateKind::Deploy => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        TaskKind::from(*self).as_str()
    }

    /// Human-readable label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            GateKind::Lint => "Lint",
            GateKind::TypeCheck => "Type check",
            GateKind::Test => "Tests",
            GateKind::Build => "Build",
            GateKind::Integration => "Integration",
            GateKind::Deploy => "Deploy",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
