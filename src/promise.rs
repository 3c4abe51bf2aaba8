//! Single-use promises fulfilled by background threads.
//!
//! [`spawn`] starts a task on its own thread and hands back a
//! [`Promise`] for the result. [`async_fn`] wraps a function so every
//! call starts a fresh execution; [`async_memo`] additionally caches the
//! first result so the wrapped function runs at most once.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam_channel::{bounded, Receiver};

use crate::error::{Error, Result};
use crate::invoke;

/// Handle for one result produced by a background task.
///
/// The producing thread fulfils the promise exactly once. If the task
/// panics, the panic is recovered and logged on the producer side and
/// [`wait`](Promise::wait) reports [`Error::PromiseDropped`].
pub struct Promise<T> {
    receiver: Receiver<T>,
}

impl<T> Promise<T> {
    /// Blocks until the value is ready and takes it.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().map_err(|_| Error::PromiseDropped)
    }

    /// Takes the value if it is already ready.
    ///
    /// A `Some` consumes the promise's value; a later `wait` would fail.
    pub fn try_wait(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("ready", &!self.receiver.is_empty())
            .finish()
    }
}

/// Runs `task` on a new thread and returns the promise of its result.
///
/// ```
/// let p = taskmill::promise::spawn(|| 40 + 2);
/// assert_eq!(p.wait().unwrap(), 42);
/// ```
pub fn spawn<T, F>(task: F) -> Promise<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    thread::spawn(move || {
        // a recovered panic drops the sender and the promise reports it
        if let Ok(value) = invoke::try_call(task) {
            let _ = sender.send(value);
        }
    });
    Promise { receiver }
}

/// Wraps `task` so each call starts a fresh background execution.
pub fn async_fn<T, F>(task: F) -> impl Fn() -> Promise<T>
where
    T: Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let task = Arc::new(task);
    move || {
        let task = task.clone();
        spawn(move || (*task)())
    }
}

/// Wraps `task` so it runs at most once; every promise resolves to a
/// clone of the cached result.
///
/// Concurrent first calls race to initialize; the losers block inside
/// their producer thread until the winner finishes, so the function body
/// executes exactly once. A panicking first run leaves the cache empty
/// and the next call tries again.
pub fn async_memo<T, F>(task: F) -> impl Fn() -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let task = Arc::new(task);
    let cache: Arc<OnceLock<T>> = Arc::new(OnceLock::new());
    move || {
        let task = task.clone();
        let cache = cache.clone();
        spawn(move || cache.get_or_init(|| (*task)()).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_spawn_delivers_value() {
        let p = spawn(|| "veni".to_string() + " vidi");
        assert_eq!(p.wait().unwrap(), "veni vidi");
    }

    #[test]
    fn test_panicking_producer_reports_dropped() {
        let p: Promise<u32> = spawn(|| panic!("producer died"));
        assert_eq!(p.wait(), Err(Error::PromiseDropped));
    }

    #[test]
    fn test_try_wait_before_and_after_fulfilment() {
        let p = spawn(|| {
            thread::sleep(Duration::from_millis(50));
            7
        });
        assert_eq!(p.try_wait(), None);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(p.try_wait(), Some(7));
    }

    #[test]
    fn test_async_fn_runs_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let get = {
            let calls = calls.clone();
            async_fn(move || calls.fetch_add(1, Ordering::SeqCst))
        };

        let a = get();
        let b = get();
        let mut seen = vec![a.wait().unwrap(), b.wait().unwrap()];
        seen.sort_unstable();

        assert_eq!(seen, vec![0, 1]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_async_memo_runs_once_under_concurrency() {
        let calls = Arc::new(AtomicUsize::new(0));
        let get = {
            let calls = calls.clone();
            Arc::new(async_memo(move || {
                thread::sleep(Duration::from_millis(10));
                calls.fetch_add(1, Ordering::SeqCst);
                42
            }))
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let get = get.clone();
                thread::spawn(move || get().wait().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_async_memo_retries_after_panicked_init() {
        let calls = Arc::new(AtomicUsize::new(0));
        let get = {
            let calls = calls.clone();
            async_memo(move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first init fails");
                }
                "ok"
            })
        };

        assert_eq!(get().wait(), Err(Error::PromiseDropped));
        assert_eq!(get().wait().unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
