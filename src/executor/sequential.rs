//! In-order task execution.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::invoke;

type Task = Arc<dyn Fn() + Send + Sync>;

/// Runs registered tasks one after another, in registration order.
///
/// A panicking task is recovered and logged; the remaining tasks still
/// run. The task list survives [`execute`](SequentialExecutor::execute),
/// so calling it again replays every registered task.
pub struct SequentialExecutor {
    tasks: Mutex<Vec<Task>>,
}

impl SequentialExecutor {
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

    /// Appends every task from `tasks`, preserving iteration order.
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

    /// Runs every registered task on the calling thread, in order.
    pub fn execute(&self) {
        // snapshot so tasks registered mid-run wait for the next execute
        let snapshot: Vec<Task> = self.tasks.lock().clone();
        for task in snapshot {
            invoke::run(&*task);
        }
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

impl Default for SequentialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequentialExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialExecutor")
            .field("tasks", &self.len())
            .finish()
    }
}
