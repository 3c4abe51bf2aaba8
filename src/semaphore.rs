//! Counting semaphore with an explicit close signal.

use std::fmt;

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

/// A counting semaphore bounding concurrent access to a resource.
///
/// [`acquire`](Semaphore::acquire) blocks while all permits are taken.
/// Closing the semaphore wakes every blocked acquirer with
/// [`Error::SemaphoreClosed`] so shutdown never strands a thread.
pub struct Semaphore {
    state: Mutex<State>,
    cond: Condvar,
    max: usize,
}

#[derive(Debug)]
struct State {
    free: usize,
    closed: bool,
}

impl Semaphore {
    /// Creates a semaphore with `max` permits.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero.
    pub fn new(max: usize) -> Self {
        assert!(max >= 1, "semaphore needs at least one permit");
        Self {
            state: Mutex::new(State {
                free: max,
                closed: false,
            }),
            cond: Condvar::new(),
            max,
        }
    }

    /// Takes one permit, blocking until one is free.
    ///
    /// Returns [`Error::SemaphoreClosed`] if the semaphore is closed,
    /// including while this call is blocked.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::SemaphoreClosed);
            }
            if state.free > 0 {
                state.free -= 1;
                return Ok(());
            }
            self.cond.wait(&mut state);
        }
    }

    /// Returns one permit and wakes a blocked acquirer.
    ///
    /// Calling this without a matching `acquire` is a contract violation;
    /// release builds saturate at the permit count.
    pub fn release(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.free < self.max, "release without matching acquire");
        if state.free < self.max {
            state.free += 1;
        }
        drop(state);
        self.cond.notify_one();
    }

    /// Closes the semaphore. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Number of permits currently free.
    pub fn available(&self) -> usize {
        self.state.lock().free
    }

    /// Whether the semaphore has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Semaphore")
            .field("max", &self.max)
            .field("free", &state.free)
            .field("closed", &state.closed)
            .finish()
    }
}
