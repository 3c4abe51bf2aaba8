//! Advisory cancellation tokens.
//!
//! A [`CancelToken`] carries a cancellation signal between threads. Tokens
//! form a hierarchy: cancelling a token cancels all of its descendants,
//! while a child's cancellation never propagates upward. Cancellation is
//! advisory only; tasks observe it at their own pace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Shared cancellation signal, cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled root token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                lock: Mutex::new(()),
                cond: Condvar::new(),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derives a child token that is cancelled whenever `self` is.
    ///
    /// Cancelling the child leaves `self` untouched. A child derived from
    /// an already-cancelled token starts out cancelled.
    pub fn child(&self) -> Self {
        let child = CancelToken::new();
        if self.is_cancelled() {
            child.cancel();
            return child;
        }
        {
            let mut children = self.inner.children.lock();
            // prune children that were dropped while we hold the list
            children.retain(|c| c.upgrade().is_some());
            children.push(Arc::downgrade(&child.inner));
        }
        // the parent may have been cancelled while we registered
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Cancels this token and every descendant. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Blocks the calling thread until the token is cancelled.
    pub fn wait(&self) {
        let mut guard = self.inner.lock.lock();
        while !self.is_cancelled() {
            self.inner.cond.wait(&mut guard);
        }
    }

    /// Blocks until cancellation or until `timeout` elapses.
    ///
    /// Returns `true` if the token was cancelled within the window.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.lock.lock();
        while !self.is_cancelled() {
            if self.inner.cond.wait_until(&mut guard, deadline).timed_out() {
                return self.is_cancelled();
            }
        }
        true
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        // take the lock once so waiters parked in `wait` cannot miss the flag
        drop(self.lock.lock());
        self.cond.notify_all();

        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fresh_token_is_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_parent_cancel_reaches_descendants() {
        let root = CancelToken::new();
        let child = root.child();
        let grandchild = child.child();

        root.cancel();

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_propagate_up() {
        let root = CancelToken::new();
        let child = root.child();
        let sibling = root.child();

        child.cancel();

        assert!(!root.is_cancelled());
        assert!(!sibling.is_cancelled());
    }

    #[test]
    fn test_child_of_cancelled_parent_starts_cancelled() {
        let root = CancelToken::new();
        root.cancel();
        assert!(root.child().is_cancelled());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let token = CancelToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_unblocks_on_cancel() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            thread::spawn(move || {
                token.wait();
                token.is_cancelled()
            })
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wait_timeout_sees_cancel() {
        let token = CancelToken::new();
        let other = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            other.cancel();
        });
        assert!(token.wait_timeout(Duration::from_secs(5)));
    }
}
