//! Validation errors and warnings produced while decoding a plan

use serde::Serialize;
use std::fmt;

/// Category of a structural problem found in a plan document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    /// A required field is absent
    MissingField,
    /// A field is present but has the wrong type or an unrecognized value
    WrongType,
    /// A numeric field is outside its allowed range
    OutOfRange,
    /// A reference does not resolve to a known task identifier
    UnknownDependency,
    /// An identifier is declared more than once
    DuplicateId,
    /// The dependency graph contains a cycle
    CircularDependency,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationErrorKind::MissingField => "MissingField",
            ValidationErrorKind::WrongType => "WrongType",
            ValidationErrorKind::OutOfRange => "OutOfRange",
            ValidationErrorKind::UnknownDependency => "UnknownDependency",
            ValidationErrorKind::DuplicateId => "DuplicateId",
            ValidationErrorKind::CircularDependency => "CircularDependency",
        };
        write!(f, "{label}")
    }
}

/// A single structural problem, located by a document path such as
/// `tasks[2].retry.maxAttempts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Advisory finding that never blocks execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
