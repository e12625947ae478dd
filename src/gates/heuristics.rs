//! Output heuristics that can overrule a zero exit code
//!
//! Each function takes the combined stdout+stderr of a gate and its exit
//! code and decides whether the output is consistent with success. Matching
//! is case-insensitive.

use regex::Regex;
use std::sync::LazyLock;

use crate::plan::schema::GateKind;

const TEST_SUCCESS_MARKERS: &[&str] = &["passing", "passed", "✓", "✔"];
const TEST_FAILURE_MARKERS: &[&str] = &[
    "failing",
    "failed",
    "✗",
    "✘",
    "✕",
    "error:",
    "exception",
];

const BUILD_ERROR_PHRASES: &[&str] = &[
    "build failed",
    "build error",
    "compilation failed",
    "compilation error",
    "compile error",
    "failed to compile",
    "syntax error",
    "syntaxerror",
    "type error",
    "typeerror",
];

const LINT_PROBLEM_WORDS: &[&str] = &["error", "problem", "warning", "issue"];

static TS_ERROR_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"error ts\d+").ok());

/// Whether `output` is consistent with success for a gate of `kind`
pub fn output_passes(kind: GateKind, output: &str, exit_code: Option<i32>) -> bool {
    match kind {
        GateKind::Test => tests_pass(output, exit_code),
        GateKind::Build => build_passes(output, exit_code),
        GateKind::Lint => lint_passes(output, exit_code),
        GateKind::TypeCheck | GateKind::Integration | GateKind::Deploy => exit_code == Some(0),
    }
}

/// Success markers win over failure markers; with neither, the exit code decides
pub fn tests_pass(output: &str, exit_code: Option<i32>) -> bool {
    let text = output.to_lowercase();
    if contains_any(&text, TEST_SUCCESS_MARKERS) {
        return true;
    }
    if contains_any(&text, TEST_FAILURE_MARKERS) {
        return false;
    }
    exit_code == Some(0)
}

/// Any build, compilation, syntax or type error phrase fails the build
pub fn build_passes(output: &str, exit_code: Option<i32>) -> bool {
    let text = output.to_lowercase();
    let has_error = contains_any(&text, BUILD_ERROR_PHRASES)
        || TS_ERROR_CODE.as_ref().is_some_and(|re| re.is_match(&text));
    !has_error && exit_code == Some(0)
}

/// Zero tolerance: any mention of an error, problem, warning or issue fails
pub fn lint_passes(output: &str, exit_code: Option<i32>) -> bool {
    let text = output.to_lowercase();
    !contains_any(&text, LINT_PROBLEM_WORDS) && exit_code == Some(0)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
