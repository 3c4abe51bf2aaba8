//! Bounded blocking FIFO queue with close-and-drain semantics.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

/// A bounded multi-producer multi-consumer FIFO queue.
///
/// Producers block in [`push`](Queue::push) while the queue is full,
/// consumers block in [`pop_wait`](Queue::pop_wait) while it is empty.
/// After [`close`](Queue::close), already-enqueued items still drain in
/// order; only then do consumers see [`Error::QueueClosed`].
///
/// ```
/// use taskmill::Queue;
///
/// let q = Queue::new(2);
/// q.push("a").unwrap();
/// q.push("b").unwrap();
/// q.close();
/// assert_eq!(q.pop_wait().unwrap(), "a");
/// assert_eq!(q.pop_wait().unwrap(), "b");
/// assert!(q.pop_wait().is_err());
/// ```
pub struct Queue<T> {
    // one condvar shared by pushers, poppers, and emptiness waiters;
    // every transition uses notify_all so close can never strand a waiter
    state: Mutex<State<T>>,
    cond: Condvar,
    capacity: usize,
}

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> Queue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "queue capacity must be at least 1");
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            cond: Condvar::new(),
            capacity,
        }
    }

    /// Enqueues `item`, blocking while the queue is full.
    ///
    /// Returns [`Error::QueueClosed`] if the queue is closed, including
    /// when it closes while this call is blocked. The item is dropped
    /// with the error.
    pub fn push(&self, item: T) -> Result<()> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::QueueClosed);
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.cond.wait(&mut state);
        }
        state.items.push_back(item);
        drop(state);
        self.cond.notify_all();
        Ok(())
    }

    /// Dequeues the oldest item, blocking while the queue is empty.
    ///
    /// After `close`, remaining items drain first; only an empty closed
    /// queue reports [`Error::QueueClosed`].
    pub fn pop_wait(&self) -> Result<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.cond.notify_all();
                return Ok(item);
            }
            if state.closed {
                return Err(Error::QueueClosed);
            }
            self.cond.wait(&mut state);
        }
    }

    /// Dequeues the oldest item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        let item = state.items.pop_front();
        if item.is_some() {
            drop(state);
            self.cond.notify_all();
        }
        item
    }

    /// Closes the queue. Idempotent.
    ///
    /// Blocked pushers wake with [`Error::QueueClosed`]; consumers keep
    /// draining whatever is already enqueued.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Number of items currently enqueued.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// The fixed capacity the queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks until the queue is empty.
    ///
    /// Wakes on the consumer that removes the last item; no polling.
    pub fn wait_empty(&self) {
        let mut state = self.state.lock();
        while !state.items.is_empty() {
            self.cond.wait(&mut state);
        }
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Queue")
            .field("capacity", &self.capacity)
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}
