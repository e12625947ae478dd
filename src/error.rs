//! Error types for plan loading and engine configuration
//!
//! Execution failures are not errors at this level: they are recorded on
//! each `TaskResult` so a single failing task never aborts the whole run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::plan::schema::ValidationError;

/// Failure to turn plan text into a validated `Plan`
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read plan file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The text could not be deserialized as YAML at all
    #[error("Plan is not valid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// The document deserialized but failed one or more structural checks
    #[error("{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl PlanError {
    /// Validation errors carried by this error, empty for other variants
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            PlanError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!(
        "Plan validation failed with {} error(s):\n  - {}",
        errors.len(),
        lines.join("\n  - ")
    )
}

/// Engine configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
