//! Execution graph for managing task dependencies and execution order

mod cycle;
mod nodes;
mod scheduling;


use std::collections::HashMap;

use super::parser::dependencies::{validate_dependencies, DependencyEntry};
use super::schema::{Task, ValidationError, ValidationErrorKind};
use crate::error::PlanError;

pub(crate) use cycle::find_cycles;
pub use nodes::TaskNode;

/// Dependency graph over a plan's tasks.
///
/// Nodes keep the plan's declaration order, so index `i` is `plan.tasks[i]`.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    nodes: Vec<TaskNode>,
    index: HashMap<String, usize>,
}

impl ExecutionGraph {
    /// Build an execution graph from tasks.
    ///
    /// Plans produced by the parser always succeed here. Plans assembled in
    /// code get the same duplicate, unknown-dependency and cycle checks.
    pub fn build(tasks: &[Task]) -> Result<Self, PlanError> {
        let mut errors = Vec::new();
        let mut index = HashMap::new();

        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.id.clone(), i).is_some() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("tasks[{i}].id"),
                    format!("duplicate task id '{}'", task.id),
                ));
            }
        }
        if !errors.is_empty() {
            return Err(PlanError::Validation(errors));
        }

        let entries: Vec<DependencyEntry<'_>> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| DependencyEntry {
                path: format!("tasks[{i}]"),
                id: &task.id,
                depends_on: &task.depends_on,
            })
            .collect();
        errors.extend(validate_dependencies(&entries));
        if !errors.is_empty() {
            return Err(PlanError::Validation(errors));
        }

        let mut nodes: Vec<TaskNode> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let mut dependencies = Vec::new();
                for dep in &task.depends_on {
                    if let Some(&d) = index.get(dep) {
                        if !dependencies.contains(&d) {
                            dependencies.push(d);
                        }
                    }
                }
                TaskNode {
                    id: task.id.clone(),
                    index: i,
                    dependencies,
                    dependents: Vec::new(),
                }
            })
            .collect();

        // Reverse edges, filled in declaration order of the dependent
        for i in 0..nodes.len() {
            for d in nodes[i].dependencies.clone() {
                nodes[d].dependents.push(i);
            }
        }

        Ok(Self { nodes, index })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&TaskNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn dependencies(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|n| n.dependencies.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependents(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every task that directly or transitively depends on `index`
    pub fn transitive_dependents(&self, index: usize) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = self.dependents(index).to_vec();
        while let Some(next) = stack.pop() {
            if !seen[next] {
                seen[next] = true;
                stack.extend_from_slice(self.dependents(next));
            }
        }
        (0..self.nodes.len()).filter(|&i| seen[i]).collect()
    }

    /// Task indices in a dependency-respecting order, earliest declaration first
    pub fn topological_order(&self) -> Vec<usize> {
        scheduling::topological_order(&self.nodes)
    }

    /// Groups of tasks that could run side by side
    pub fn layers(&self) -> Vec<Vec<usize>> {
        scheduling::layers(&self.nodes)
    }

    /// Task identifiers for a list of indices
    pub fn ids(&self, indices: &[usize]) -> Vec<&str> {
        indices
            .iter()
            .filter_map(|&i| self.nodes.get(i).map(|n| n.id.as_str()))
            .collect()
    }
}
