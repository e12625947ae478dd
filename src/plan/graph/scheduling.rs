//! Scheduling algorithms: topological order and parallel layers

use std::collections::BTreeSet;

use super::nodes::TaskNode;

/// Topologically sorted node indices.
///
/// Kahn's algorithm with a sorted ready set: among nodes whose dependencies
/// are all placed, the lowest declaration index comes first. Nodes on a cycle
/// are never emitted, so a short result means the graph is cyclic.
pub fn topological_order(nodes: &[TaskNode]) -> Vec<usize> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.dependencies.len()).collect();
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(index, _)| index)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &dependent in &nodes[index].dependents {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    order
}

/// Group nodes into layers: a node sits one layer after its deepest
/// dependency. Nodes in the same layer never depend on each other.
pub fn layers(nodes: &[TaskNode]) -> Vec<Vec<usize>> {
    let mut depth = vec![0usize; nodes.len()];
    for index in topological_order(nodes) {
        depth[index] = nodes[index]
            .dependencies
            .iter()
            .map(|&dep| depth[dep] + 1)
            .max()
            .unwrap_or(0);
    }

    let layer_count = depth.iter().max().map_or(0, |d| d + 1);
    let mut layers = vec![Vec::new(); layer_count];
    for (index, &d) in depth.iter().enumerate() {
        layers[d].push(index);
    }
    layers
}
