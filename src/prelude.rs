//! Convenience re-exports for the common construction surface.

pub use crate::buffer::BufferPool;
pub use crate::cancel::CancelToken;
pub use crate::error::{Error, Result};
pub use crate::executor::{ParallelExecutor, ScheduledExecutor, SequentialExecutor};
pub use crate::gate::{OnceGate, SingleFlightGate};
pub use crate::group::ErrorGroup;
pub use crate::pool::WorkerPool;
pub use crate::promise::{async_fn, async_memo, Promise};
pub use crate::queue::Queue;
pub use crate::semaphore::Semaphore;
