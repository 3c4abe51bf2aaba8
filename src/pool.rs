//! Fixed-size worker pool draining a shared queue.

use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::invoke;
use crate::queue::Queue;

const DEFAULT_NAME_PREFIX: &str = "taskmill-worker";

type Action<T> = Arc<dyn Fn(&CancelToken, T) -> Result<()> + Send + Sync>;

/// A fixed set of worker threads applying one action to queued items.
///
/// Workers block on the queue and exit once it is closed and drained.
/// A failing or panicking action is logged and the worker moves on to
/// the next item; the pool itself never aborts. Cancellation is advisory:
/// the action receives the token passed to [`run`](WorkerPool::run) and
/// decides for itself whether to observe it.
pub struct WorkerPool<T> {
    workers: usize,
    queue: Arc<Queue<T>>,
    action: Action<T>,
    name_prefix: String,
    in_flight: Arc<InFlight>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool of `workers` threads over `queue`.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero.
    pub fn new<F>(workers: usize, queue: Arc<Queue<T>>, action: F) -> Self
    where
        F: Fn(&CancelToken, T) -> Result<()> + Send + Sync + 'static,
    {
        assert!(workers >= 1, "worker pool needs at least one worker");
        Self {
            workers,
            queue,
            action: Arc::new(action),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Sets the thread-name prefix used for the workers.
    pub fn named<S: Into<String>>(mut self, prefix: S) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Worker count matching the number of logical CPUs.
    pub fn default_workers() -> usize {
        num_cpus::get()
    }

    /// Spawns the worker threads.
    ///
    /// Workers run detached until the queue is closed and drained. Each
    /// call spawns a fresh set, so `run` is normally called once.
    pub fn run(&self, token: &CancelToken) -> Result<()> {
        for id in 0..self.workers {
            let name = format!("{}-{}", self.name_prefix, id);
            let queue = self.queue.clone();
            let action = self.action.clone();
            let token = token.clone();
            let in_flight = self.in_flight.clone();
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, &queue, action.as_ref(), &token, &in_flight))
                .map_err(|e| Error::other(format!("spawn failed: {}", e)))?;
        }
        Ok(())
    }

    /// Blocks until every in-flight action has completed.
    ///
    /// This only waits out work that is already executing; it does not
    /// close or drain the queue. Close the queue first so the workers
    /// stop picking up new items.
    pub fn close(&self) {
        self.in_flight.wait_idle();
    }

    /// Number of worker threads this pool spawns.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The queue this pool drains.
    pub fn queue(&self) -> &Arc<Queue<T>> {
        &self.queue
    }
}

fn worker_loop<T>(
    name: &str,
    queue: &Queue<T>,
    action: &(dyn Fn(&CancelToken, T) -> Result<()> + Send + Sync),
    token: &CancelToken,
    in_flight: &InFlight,
) {
    debug!(worker = name, "worker started");
    loop {
        let item = match queue.pop_wait() {
            Ok(item) => item,
            // closed and drained, nothing left to do
            Err(_) => break,
        };
        in_flight.enter();
        let result = invoke::try_run_err(|| action(token, item));
        if let Err(err) = result {
            // panics were already logged by the invoker
            if !err.is_panic() {
                error!(worker = name, error = %err, "worker action failed");
            }
        }
        in_flight.exit();
    }
    debug!(worker = name, "worker exiting");
}

#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    cond: Condvar,
}

impl InFlight {
    fn enter(&self) {
        *self.count.lock() += 1;
    }

    fn exit(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.cond.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.cond.wait(&mut count);
        }
    }
}

impl<T> fmt::Debug for WorkerPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("name_prefix", &self.name_prefix)
            .field("queue", &self.queue)
            .finish()
    }
}
