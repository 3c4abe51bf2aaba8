//! Error-aggregating task group with cancellation.
//!
//! An [`ErrorGroup`] launches fallible tasks on their own threads,
//! remembers the first failure, and cancels a derived [`CancelToken`] so
//! sibling tasks can stop early. Panics inside tasks are recovered and
//! normalized into [`Error::Panicked`](crate::Error::Panicked), so the
//! group's caller always deals with plain errors.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::invoke;

const GROUP_THREAD_NAME: &str = "taskmill-group";
const RETRY_TICK: Duration = Duration::from_millis(10);

/// A group of tasks where the first error wins.
///
/// [`go`](ErrorGroup::go) launches tasks, [`wait`](ErrorGroup::wait)
/// joins them all and reports the first error. An optional concurrency
/// limit makes `go` block (and [`try_go`](ErrorGroup::try_go) refuse)
/// while the group is saturated.
pub struct ErrorGroup {
    token: CancelToken,
    state: Arc<GroupState>,
}

struct GroupState {
    lock: Mutex<Counts>,
    cond: Condvar,
}

struct Counts {
    active: usize,
    limit: Option<usize>,
    first_err: Option<Error>,
}

impl Counts {
    fn at_limit(&self) -> bool {
        self.limit.is_some_and(|limit| self.active >= limit)
    }
}

impl ErrorGroup {
    /// Creates a group with a fresh root token.
    pub fn new() -> Self {
        Self::with_cancel(&CancelToken::new()).0
    }

    /// Creates a group whose token is a child of `parent`.
    ///
    /// The returned token is cancelled on the group's first task failure
    /// and again when [`wait`](ErrorGroup::wait) returns; hand it to the
    /// tasks that should notice either.
    pub fn with_cancel(parent: &CancelToken) -> (Self, CancelToken) {
        let token = parent.child();
        let group = Self {
            token: token.clone(),
            state: Arc::new(GroupState {
                lock: Mutex::new(Counts {
                    active: 0,
                    limit: None,
                    first_err: None,
                }),
                cond: Condvar::new(),
            }),
        };
        (group, token)
    }

    /// The group's derived token.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Caps how many tasks may run at once. `0` permits none.
    ///
    /// Call this before the first task is launched; changing the limit
    /// with tasks in flight is a contract violation.
    pub fn set_limit(&self, limit: usize) {
        let mut counts = self.state.lock.lock();
        debug_assert!(counts.active == 0, "limit changed with tasks in flight");
        counts.limit = Some(limit);
    }

    /// Launches `task` on its own thread.
    ///
    /// With a limit set, blocks until a slot frees up. The task's error,
    /// or its recovered panic, becomes the group error if it is first.
    pub fn go<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let mut counts = self.state.lock.lock();
        while counts.at_limit() {
            self.state.cond.wait(&mut counts);
        }
        counts.active += 1;
        drop(counts);
        self.spawn_task(task);
    }

    /// Launches `task` unless the group is at its limit.
    ///
    /// Returns whether the task was launched.
    pub fn try_go<F>(&self, task: F) -> bool
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        {
            let mut counts = self.state.lock.lock();
            if counts.at_limit() {
                return false;
            }
            counts.active += 1;
        }
        self.spawn_task(task);
        true
    }

    /// Keeps trying to launch `task` until it fits or `token` cancels.
    ///
    /// Returns whether the task was launched.
    pub fn retry_go<F>(&self, token: &CancelToken, task: F) -> bool
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let mut counts = self.state.lock.lock();
        loop {
            if token.is_cancelled() {
                return false;
            }
            if !counts.at_limit() {
                counts.active += 1;
                drop(counts);
                self.spawn_task(task);
                return true;
            }
            // woken early when a task finishes, otherwise recheck the token
            let _ = self.state.cond.wait_for(&mut counts, RETRY_TICK);
        }
    }

    /// Blocks until every launched task finished.
    ///
    /// Returns the first error any task produced, cancels the derived
    /// token either way. Launching more tasks after `wait` returned is a
    /// contract violation.
    pub fn wait(&self) -> Result<()> {
        let first_err = {
            let mut counts = self.state.lock.lock();
            while counts.active > 0 {
                self.state.cond.wait(&mut counts);
            }
            counts.first_err.clone()
        };
        self.token.cancel();
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn spawn_task<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let state = self.state.clone();
        let token = self.token.clone();
        let spawned = thread::Builder::new()
            .name(GROUP_THREAD_NAME.to_string())
            .spawn(move || {
                let result = invoke::try_run_err(task);
                finish(&state, &token, result);
            });
        if let Err(e) = spawned {
            // roll the reservation back and surface the spawn failure
            let err = Error::other(format!("spawn failed: {}", e));
            finish(&self.state, &self.token, Err(err));
        }
    }
}

fn finish(state: &GroupState, token: &CancelToken, result: Result<()>) {
    let failed = {
        let mut counts = state.lock.lock();
        counts.active -= 1;
        match result {
            Err(err) if counts.first_err.is_none() => {
                counts.first_err = Some(err);
                true
            }
            _ => false,
        }
    };
    if failed {
        token.cancel();
    }
    state.cond.notify_all();
}

impl Default for ErrorGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.state.lock.lock();
        f.debug_struct("ErrorGroup")
            .field("active", &counts.active)
            .field("limit", &counts.limit)
            .field("failed", &counts.first_err.is_some())
            .finish()
    }
}
