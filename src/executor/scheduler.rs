//! Dependency-ordered scheduling of task runs
//!
//! One coordinator owns all scheduling state. Task runs happen on scoped
//! worker threads that report back over a channel, so the coordinator is the
//! only place where statuses change.

use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

use super::TaskExecutor;
use crate::models::{TaskResult, TaskStatus};
use crate::plan::graph::ExecutionGraph;
use crate::plan::schema::Task;

/// Run every task of `graph` in dependency order.
///
/// Results are returned in completion order. Tasks that never started
/// because the run halted or was cancelled have no result.
pub(super) fn run_graph(
    executor: &TaskExecutor,
    tasks: &[Task],
    graph: &ExecutionGraph,
) -> Vec<TaskResult> {
    let config = executor.config();
    let cancel = executor.cancel_flag();
    let limit = config.max_parallel.max(1);
    let order = graph.topological_order();

    let mut slots = vec![TaskStatus::Pending; tasks.len()];
    let mut results = Vec::with_capacity(tasks.len());
    let mut halted = false;
    let mut running = 0usize;
    let (tx, rx) = mpsc::channel::<(usize, TaskResult)>();

    thread::scope(|scope| loop {
        if !halted && !cancel.is_cancelled() {
            skip_blocked(tasks, graph, &order, &mut slots, &mut results);

            for index in 0..tasks.len() {
                if running >= limit {
                    break;
                }
                let ready = slots[index] == TaskStatus::Pending
                    && graph
                        .dependencies(index)
                        .iter()
                        .all(|&dep| slots[dep] == TaskStatus::Completed);
                if !ready {
                    continue;
                }

                slots[index] = TaskStatus::Running;
                running += 1;
                let task = &tasks[index];
                let tx = tx.clone();
                debug!(task = %task.id, status = %slots[index], running, "starting task");
                scope.spawn(move || {
                    let result = executor.run_task(task);
                    let _ = tx.send((index, result));
                });
            }
        }

        if running == 0 {
            break;
        }

        let Ok((index, result)) = rx.recv() else {
            break;
        };
        running -= 1;
        slots[index] = result.status;

        if result.is_failed() && !config.continue_on_error && !halted {
            halted = true;
            let pending = slots.iter().filter(|s| **s == TaskStatus::Pending).count();
            warn!(
                task = %result.task_id,
                pending,
                "task failed, halting execution"
            );
        }
        results.push(result);
    });

    if cancel.is_cancelled() {
        let pending = slots.iter().filter(|s| **s == TaskStatus::Pending).count();
        warn!(pending, "execution cancelled");
    }

    results
}

/// Record waiting tasks whose dependencies can no longer complete as
/// skipped. `order` is topological, so skips cascade in a single pass.
fn skip_blocked(
    tasks: &[Task],
    graph: &ExecutionGraph,
    order: &[usize],
    slots: &mut [TaskStatus],
    results: &mut Vec<TaskResult>,
) {
    for &index in order {
        if slots[index] != TaskStatus::Pending {
            continue;
        }
        let blocker = graph
            .dependencies(index)
            .iter()
            .find_map(|&dep| match slots[dep] {
                status @ (TaskStatus::Failed | TaskStatus::Skipped) => Some((dep, status)),
                TaskStatus::Pending | TaskStatus::Running | TaskStatus::Completed => None,
            });
        if let Some((dep, status)) = blocker {
            let reason = format!("dependency '{}' did not complete ({status})", tasks[dep].id);
            info!(task = %tasks[index].id, "skipping task: {reason}");
            slots[index] = TaskStatus::Skipped;
            results.push(TaskResult::skipped(&tasks[index].id, reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Vec<Task>, ExecutionGraph) {
        let tasks = vec![
            Task::command("a", "A", "true"),
            Task::command("b", "B", "true").depends_on(["a"]),
            Task::command("c", "C", "true").depends_on(["b"]),
        ];
        let graph = ExecutionGraph::build(&tasks).unwrap();
        (tasks, graph)
    }

    #[test]
    fn test_running_dependency_does_not_skip() {
        let (tasks, graph) = chain();
        let order = graph.topological_order();
        let mut slots = vec![TaskStatus::Running, TaskStatus::Pending, TaskStatus::Pending];
        let mut results = Vec::new();

        skip_blocked(&tasks, &graph, &order, &mut slots, &mut results);

        assert!(results.is_empty());
        assert_eq!(slots[1], TaskStatus::Pending);
    }

    #[test]
    fn test_failed_dependency_skips_transitively() {
        let (tasks, graph) = chain();
        let order = graph.topological_order();
        let mut slots = vec![TaskStatus::Failed, TaskStatus::Pending, TaskStatus::Pending];
        let mut results = Vec::new();

        skip_blocked(&tasks, &graph, &order, &mut slots, &mut results);

        assert_eq!(
            slots,
            vec![TaskStatus::Failed, TaskStatus::Skipped, TaskStatus::Skipped]
        );
        assert_eq!(results.len(), 2);
        assert!(results[1].error.as_deref().unwrap().contains("'b'"));
    }
}
