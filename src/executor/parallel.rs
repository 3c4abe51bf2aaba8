//! Fan-out task execution with a join barrier.

use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::invoke;

type Task = Arc<dyn Fn() + Send + Sync>;

/// Runs every registered task on its own thread and joins them all.
///
/// [`execute`](ParallelExecutor::execute) returns only after the last
/// task finished. Tasks run in no particular order; panics are recovered
/// per task and never abort the barrier. Like
/// [`SequentialExecutor`](crate::SequentialExecutor), the task list is
/// reusable across executions.
pub struct ParallelExecutor {
    tasks: Mutex<Vec<Task>>,
}

impl ParallelExecutor {
    /// Creates an executor with an empty task list.
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Appends one task to the list.
    pub fn add<F: Fn() + Send + Sync + 'static>(&self, task: F) {
        self.tasks.lock().push(Arc::new(task));
    }

    /// Appends every task from `tasks`.
    pub fn add_all<I>(&self, tasks: I)
    where
        I: IntoIterator,
        I::Item: Fn() + Send + Sync + 'static,
    {
        let mut list = self.tasks.lock();
        for task in tasks {
            list.push(Arc::new(task));
        }
    }

    /// Runs all registered tasks concurrently and waits for every one.
    pub fn execute(&self) {
        let snapshot: Vec<Task> = self.tasks.lock().clone();
        thread::scope(|scope| {
            for task in snapshot {
                scope.spawn(move || invoke::run(&*task));
            }
        });
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("tasks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[test]
    fn test_all_tasks_run() {
        let seen = Arc::new(Mutex::new(HashSet::new()));
        let exec = ParallelExecutor::new();

        for i in 0..8 {
            let seen = seen.clone();
            exec.add(move || {
                seen.lock().insert(i);
            });
        }
        exec.execute();

        assert_eq!(seen.lock().len(), 8);
    }

    #[test]
    fn test_execute_waits_for_every_task() {
        let done = Arc::new(AtomicUsize::new(0));
        let exec = ParallelExecutor::new();

        for _ in 0..4 {
            let done = done.clone();
            exec.add(move || {
                thread::sleep(Duration::from_millis(30));
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        exec.execute();

        assert_eq!(done.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_tasks_overlap_in_time() {
        let exec = ParallelExecutor::new();
        for _ in 0..4 {
            exec.add(|| thread::sleep(Duration::from_millis(50)));
        }

        let start = Instant::now();
        exec.execute();

        // four 50ms sleeps in series would need 200ms
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn test_panicking_task_does_not_break_the_barrier() {
        let done = Arc::new(AtomicUsize::new(0));
        let exec = ParallelExecutor::new();

        exec.add(|| panic!("one of them fails"));
        for _ in 0..3 {
            let done = done.clone();
            exec.add(move || {
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        exec.execute();

        assert_eq!(done.load(Ordering::SeqCst), 3);
    }
}
