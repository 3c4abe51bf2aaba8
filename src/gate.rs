//! Execution gates: one-shot and single-flight.
//!
//! [`OnceGate`] runs a task at most once, ever. [`SingleFlightGate`]
//! collapses only *concurrent* calls onto one execution and rearms once
//! the in-flight run finishes. Callers that arrive mid-execution block
//! until it completes, so both gates double as "wait for initialization"
//! points.

use std::fmt;

use parking_lot::{Condvar, Mutex};

use crate::invoke;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnceState {
    Idle,
    Running,
    Complete,
}

/// Gate that lets exactly one task through for its whole lifetime.
///
/// The first caller runs the task; concurrent callers block until that
/// run completes, later callers return immediately. A panicking task
/// still consumes the execution.
pub struct OnceGate {
    state: Mutex<OnceState>,
    cond: Condvar,
}

impl OnceGate {
    /// Creates an unfired gate.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OnceState::Idle),
            cond: Condvar::new(),
        }
    }

    /// Runs `task` if nothing has run through this gate yet.
    ///
    /// Returns whether this call performed the execution. Callers that
    /// arrive while the task is running block until it finishes and then
    /// return `false`.
    pub fn run<F: FnOnce()>(&self, task: F) -> bool {
        let mut state = self.state.lock();
        loop {
            match *state {
                OnceState::Idle => {
                    *state = OnceState::Running;
                    break;
                }
                OnceState::Running => self.cond.wait(&mut state),
                OnceState::Complete => return false,
            }
        }
        drop(state);

        // a panic is recovered and still completes the gate
        invoke::run(task);

        *self.state.lock() = OnceState::Complete;
        self.cond.notify_all();
        true
    }

    /// Whether the gate's single execution has completed.
    pub fn is_complete(&self) -> bool {
        *self.state.lock() == OnceState::Complete
    }
}

impl Default for OnceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OnceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceGate")
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Gate that admits one execution at a time and rearms afterwards.
///
/// While a task is in flight, other callers block until it completes and
/// return `false` without running their own task. Once the flight ends
/// the gate is open again, unlike [`OnceGate`].
pub struct SingleFlightGate {
    running: Mutex<bool>,
    cond: Condvar,
}

impl SingleFlightGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self {
            running: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Runs `task` unless another call is already in flight.
    ///
    /// Returns whether this call performed the execution. Followers block
    /// until the in-flight run completes, then return `false`.
    pub fn run<F: FnOnce()>(&self, task: F) -> bool {
        let mut running = self.running.lock();
        if *running {
            while *running {
                self.cond.wait(&mut running);
            }
            return false;
        }
        *running = true;
        drop(running);

        invoke::run(task);

        *self.running.lock() = false;
        self.cond.notify_all();
        true
    }

    /// Whether a call is currently in flight.
    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }
}

impl Default for SingleFlightGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SingleFlightGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightGate")
            .field("running", &*self.running.lock())
            .finish()
    }
}
