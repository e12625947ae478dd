//! Graph node types for the execution graph

/// A task in the execution graph, addressed by its declaration index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: String,
    /// Position of the task in the plan
    pub index: usize,
    /// Indices of the tasks this task waits for, in `dependsOn` order
    pub dependencies: Vec<usize>,
    /// Indices of the tasks waiting for this one, in declaration order
    pub dependents: Vec<usize>,
}

impl TaskNode {
    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }
}
