//! Fixed-interval repeating execution.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;

use crate::invoke;

/// Runs one task repeatedly on a fixed interval until closed.
///
/// [`execute`](ScheduledExecutor::execute) blocks the calling thread and
/// loops until [`close`](ScheduledExecutor::close) is called from
/// somewhere else; a tick that is already running finishes before the
/// loop exits. The task runs through the panic-safe invoker, so a panic
/// skips one firing instead of ending the schedule.
pub struct ScheduledExecutor {
    interval: Duration,
    task: Box<dyn Fn() + Send + Sync>,
    stop: Mutex<Option<Sender<()>>>,
    stopped: Receiver<()>,
}

impl ScheduledExecutor {
    /// Creates an executor firing `task` every `interval`.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new<F: Fn() + Send + Sync + 'static>(interval: Duration, task: F) -> Self {
        assert!(interval > Duration::ZERO, "interval must be positive");
        let (stop, stopped) = bounded(0);
        Self {
            interval,
            task: Box::new(task),
            stop: Mutex::new(Some(stop)),
            stopped,
        }
    }

    /// Runs the schedule on the calling thread until the executor closes.
    ///
    /// Calling this after `close` returns immediately.
    pub fn execute(&self) {
        let ticker = tick(self.interval);
        loop {
            select! {
                recv(ticker) -> _ => invoke::run(|| (self.task)()),
                // dropping the sender disconnects this arm
                recv(self.stopped) -> _ => break,
            }
        }
    }

    /// Stops the schedule. Idempotent.
    pub fn close(&self) {
        self.stop.lock().take();
    }

    /// Whether the executor has been closed.
    pub fn is_closed(&self) -> bool {
        self.stop.lock().is_none()
    }
}

impl fmt::Debug for ScheduledExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledExecutor")
            .field("interval", &self.interval)
            .field("closed", &self.is_closed())
            .finish()
    }
}
