//! Cycle detection over an index-based adjacency list

/// Find dependency cycles using DFS with a recursion stack.
///
/// `dependencies[i]` lists the nodes that node `i` depends on. Every back
/// edge found is reported once as a closed path (`[a, b, a]`), so a graph is
/// acyclic iff the result is empty. Roots are visited in index order, which
/// makes the output deterministic.
pub fn find_cycles(dependencies: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; dependencies.len()];
    let mut on_stack = vec![false; dependencies.len()];
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for node in 0..dependencies.len() {
        if !visited[node] {
            dfs_collect_cycles(
                dependencies,
                node,
                &mut visited,
                &mut on_stack,
                &mut path,
                &mut cycles,
            );
        }
    }

    cycles
}

fn dfs_collect_cycles(
    dependencies: &[Vec<usize>],
    node: usize,
    visited: &mut [bool],
    on_stack: &mut [bool],
    path: &mut Vec<usize>,
    cycles: &mut Vec<Vec<usize>>,
) {
    visited[node] = true;
    on_stack[node] = true;
    path.push(node);

    for &dep in &dependencies[node] {
        if dep >= dependencies.len() {
            continue;
        }
        if !visited[dep] {
            dfs_collect_cycles(dependencies, dep, visited, on_stack, path, cycles);
        } else if on_stack[dep] {
            // Back edge: the cycle is the path suffix starting at `dep`
            if let Some(start) = path.iter().position(|&n| n == dep) {
                let mut cycle = path[start..].to_vec();
                cycle.push(dep);
                cycles.push(cycle);
            }
        }
    }

    path.pop();
    on_stack[node] = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        // 0 <- 1 <- 2, 0 <- 2
        let deps = vec![vec![], vec![0], vec![1, 0]];
        assert!(find_cycles(&deps).is_empty());
    }

    #[test]
    fn test_self_loop() {
        let deps = vec![vec![0]];
        assert_eq!(find_cycles(&deps), vec![vec![0, 0]]);
    }

    #[test]
    fn test_mutual_dependency() {
        let deps = vec![vec![1], vec![0]];
        assert_eq!(find_cycles(&deps), vec![vec![0, 1, 0]]);
    }

    #[test]
    fn test_long_cycle_reports_full_path() {
        // 0 -> 1 -> 2 -> 3 -> 1, plus an unrelated node 4
        let deps = vec![vec![1], vec![2], vec![3], vec![1], vec![]];
        assert_eq!(find_cycles(&deps), vec![vec![1, 2, 3, 1]]);
    }

    #[test]
    fn test_disjoint_cycles_are_all_reported() {
        let deps = vec![vec![1], vec![0], vec![3], vec![2]];
        let cycles = find_cycles(&deps);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec![0, 1, 0]);
        assert_eq!(cycles[1], vec![2, 3, 2]);
    }
}
