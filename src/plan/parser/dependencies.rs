//! Dependency cross-validation: unknown references and cycles

use std::collections::HashMap;

use crate::plan::graph::find_cycles;
use crate::plan::schema::{ValidationError, ValidationErrorKind};

/// A task as seen by dependency validation
pub(crate) struct DependencyEntry<'a> {
    /// Document path of the task, e.g. `tasks[3]`
    pub path: String,
    pub id: &'a str,
    pub depends_on: &'a [String],
}

/// Report unknown dependencies and every dependency cycle.
///
/// Entries must have unique identifiers. Cycle detection runs over the
/// resolvable edges only, so an unknown reference is reported exactly once.
pub(crate) fn validate_dependencies(entries: &[DependencyEntry<'_>]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let index: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.id, i))
        .collect();

    let mut adjacency = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut edges = Vec::new();
        for (j, dep) in entry.depends_on.iter().enumerate() {
            match index.get(dep.as_str()) {
                Some(&target) => edges.push(target),
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependency,
                    format!("{}.dependsOn[{j}]", entry.path),
                    format!("task '{}' depends on unknown task '{dep}'", entry.id),
                )),
            }
        }
        adjacency.push(edges);
    }

    for cycle in find_cycles(&adjacency) {
        let names: Vec<&str> = cycle.iter().map(|&i| entries[i].id).collect();
        let start = &entries[cycle[0]];
        errors.push(ValidationError::new(
            ValidationErrorKind::CircularDependency,
            format!("{}.dependsOn", start.path),
            format!("circular dependency detected: {}", names.join(" -> ")),
        ));
    }

    errors
}

/// Report gates whose `taskId` does not name a known task
pub(crate) fn validate_gate_references<'a>(
    gates: impl IntoIterator<Item = (String, &'a str)>,
    task_ids: &[&str],
) -> Vec<ValidationError> {
    gates
        .into_iter()
        .filter(|(_, task_id)| !task_ids.contains(task_id))
        .map(|(path, task_id)| {
            ValidationError::new(
                ValidationErrorKind::UnknownDependency,
                path,
                format!("gate references unknown task '{task_id}'"),
            )
        })
        .collect()
}
