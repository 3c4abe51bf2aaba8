//! Panic-safe task invocation.
//!
//! Every task routed through here runs under `catch_unwind`: a panicking
//! task is recovered, logged together with a captured backtrace, and
//! reported as [`Error::Panicked`] instead of unwinding into the caller.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use tracing::error;

use crate::error::{Error, Result};

/// Runs `task`, suppressing any panic it raises.
///
/// The panic is still logged at error level with a backtrace. Use this for
/// fire-and-forget work where there is nobody left to hand the error to.
pub fn run<F: FnOnce()>(task: F) {
    let _ = try_run(task);
}

/// Runs `task` and reports a recovered panic as [`Error::Panicked`].
pub fn try_run<F: FnOnce()>(task: F) -> Result<()> {
    try_call(task)
}

/// Runs a fallible `task`.
///
/// The task's own error passes through untouched; a panic is normalized to
/// [`Error::Panicked`] so callers see a single error channel.
pub fn try_run_err<F: FnOnce() -> Result<()>>(task: F) -> Result<()> {
    try_call(task)?
}

/// Runs `task` on a new detached thread, panics suppressed.
pub fn spawn<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    thread::spawn(move || run(task));
}

pub(crate) fn try_call<T, F: FnOnce() -> T>(task: F) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(task)) {
        Ok(value) => Ok(value),
        Err(payload) => Err(recovered(payload)),
    }
}

fn recovered(payload: Box<dyn Any + Send>) -> Error {
    let text = payload_text(payload);
    error!(
        error = %text,
        stack = %Backtrace::force_capture(),
        "recovered from panic"
    );
    Error::Panicked(text)
}

fn payload_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<Error>() {
        e.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
