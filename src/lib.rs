//! taskmill - thread-backed concurrency primitives.
//!
//! Building blocks for coordinating plain OS threads: a bounded
//! [`Queue`], a [`WorkerPool`] draining it, sequential/parallel/scheduled
//! executors, a first-error-wins [`ErrorGroup`] with advisory
//! cancellation, a counting [`Semaphore`], execution gates, and
//! thread-backed [`Promise`]s. Every task runs panic-safe: a panic is
//! recovered, logged through `tracing`, and surfaced as an error instead
//! of tearing down a worker.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use taskmill::{CancelToken, Queue, WorkerPool};
//!
//! let queue = Arc::new(Queue::new(8));
//! let pool = WorkerPool::new(2, queue.clone(), |_token, n: u32| {
//!     println!("crunching {n}");
//!     Ok(())
//! });
//!
//! pool.run(&CancelToken::new()).unwrap();
//! for n in 0..4 {
//!     queue.push(n).unwrap();
//! }
//! queue.close();
//! queue.wait_empty();
//! pool.close();
//! ```
//!
//! # Highlights
//!
//! - **Bounded queues**: blocking push/pop with close-and-drain shutdown
//! - **Worker pools**: fixed thread sets with per-item panic isolation
//! - **Executors**: in-order, fan-out parallel, and fixed-interval modes
//! - **Error groups**: first error wins, siblings see a cancelled token
//! - **Gates and promises**: one-shot or single-flight execution, plus
//!   memoized background results

#![warn(missing_docs, missing_debug_implementations)]

pub mod buffer;
pub mod cancel;
pub mod error;
pub mod executor;
pub mod gate;
pub mod group;
pub mod invoke;
pub mod pool;
pub mod prelude;
pub mod promise;
pub mod queue;
pub mod semaphore;

// Re-export key types at crate root
pub use buffer::BufferPool;
pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use executor::{ParallelExecutor, ScheduledExecutor, SequentialExecutor};
pub use gate::{OnceGate, SingleFlightGate};
pub use group::ErrorGroup;
pub use pool::WorkerPool;
pub use promise::Promise;
pub use queue::Queue;
pub use semaphore::Semaphore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_queue_and_pool_smoke() {
        let queue = Arc::new(Queue::new(4));
        let sum = Arc::new(parking_lot::Mutex::new(0u64));
        let pool = {
            let sum = sum.clone();
            WorkerPool::new(2, queue.clone(), move |_token, n: u64| {
                *sum.lock() += n;
                Ok(())
            })
        };

        pool.run(&CancelToken::new()).unwrap();
        for n in 1..=10 {
            queue.push(n).unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while *sum.lock() != 55 {
            assert!(Instant::now() < deadline, "pool did not drain in time");
            std::thread::sleep(Duration::from_millis(5));
        }

        queue.close();
        pool.close();
    }

    #[test]
    fn test_error_group_smoke() {
        let group = ErrorGroup::new();
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = counter.clone();
            group.go(move || {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            });
        }

        assert!(group.wait().is_ok());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[test]
    fn test_promise_smoke() {
        let p = promise::spawn(|| 21 * 2);
        assert_eq!(p.wait().unwrap(), 42);
    }
}
