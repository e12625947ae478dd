//! Plan document parser - decodes and validates YAML plan documents

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod decode;
pub(crate) mod dependencies;


use crate::error::PlanError;
use crate::plan::schema::{Plan, ValidationError, ValidationErrorKind, ValidationWarning};
use decode::Decoder;

/// Result of parsing a plan document
#[derive(Debug, Clone)]
pub struct ParsedPlan {
    pub plan: Plan,
    /// Advisory findings that did not block parsing
    pub warnings: Vec<ValidationWarning>,
    /// File the plan was read from, when parsed from disk
    pub source_path: Option<PathBuf>,
}

/// Parse and validate a plan file
pub fn parse_plan(path: &Path) -> Result<ParsedPlan, PlanError> {
    let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parsed = parse_plan_content(&content)?;
    parsed.source_path = Some(path.to_path_buf());
    Ok(parsed)
}

/// Parse and validate plan text, keeping warnings
pub fn parse_plan_content(content: &str) -> Result<ParsedPlan, PlanError> {
    if content.trim().is_empty() {
        return Err(PlanError::Validation(vec![ValidationError::new(
            ValidationErrorKind::MissingField,
            "$",
            "plan document is empty",
        )]));
    }

    let document: serde_yaml::Value = serde_yaml::from_str(content)?;
    let outcome = Decoder::default().decode(&document);

    for warning in &outcome.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    if !outcome.errors.is_empty() {
        debug!(errors = outcome.errors.len(), "plan validation failed");
        return Err(PlanError::Validation(outcome.errors));
    }

    let plan = outcome.plan.ok_or_else(|| {
        PlanError::Validation(vec![ValidationError::new(
            ValidationErrorKind::MissingField,
            "metadata",
            "required field 'metadata' is missing",
        )])
    })?;

    debug!(
        plan = %plan.metadata.id,
        tasks = plan.tasks.len(),
        gates = plan.quality_gates.len(),
        "parsed plan"
    );

    Ok(ParsedPlan {
        plan,
        warnings: outcome.warnings,
        source_path: None,
    })
}

/// Parse and validate plan text.
///
/// Fails with `PlanError::Syntax` when the text is not YAML at all and with
/// `PlanError::Validation` listing every structural problem otherwise.
pub fn parse(content: &str) -> Result<Plan, PlanError> {
    parse_plan_content(content).map(|parsed| parsed.plan)
}
