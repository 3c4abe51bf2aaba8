//! Task executors.
//!
//! Three execution strategies over registered task lists: one after
//! another in registration order, all at once on dedicated threads, or
//! repeatedly on a fixed interval until closed. Every task runs through
//! the panic-safe invoker, so one failing task never takes down the rest.

pub mod parallel;
pub mod scheduled;
pub mod sequential;

pub use parallel::ParallelExecutor;
pub use scheduled::ScheduledExecutor;
pub use sequential::SequentialExecutor;
