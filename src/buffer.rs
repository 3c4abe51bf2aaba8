//! Reusable byte-buffer pool.

use std::fmt;

use parking_lot::Mutex;

/// Pool of `Vec<u8>` buffers sharing one fixed capacity.
///
/// [`get`](BufferPool::get) hands out an empty buffer, pooled or freshly
/// allocated. [`put`](BufferPool::put) clears a buffer and keeps it for
/// reuse; buffers whose capacity changed (they grew past the pool size)
/// are silently discarded instead.
pub struct BufferPool {
    buf_capacity: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Creates a pool of buffers with `buf_capacity` bytes each.
    ///
    /// # Panics
    ///
    /// Panics if `buf_capacity` is zero.
    pub fn new(buf_capacity: usize) -> Self {
        assert!(buf_capacity >= 1, "buffer capacity must be at least 1");
        Self {
            buf_capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Takes an empty buffer from the pool, allocating if none is free.
    pub fn get(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.buf_capacity))
    }

    /// Returns `buf` to the pool.
    ///
    /// The buffer is cleared first; a buffer whose capacity no longer
    /// matches the pool is dropped.
    pub fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() != self.buf_capacity {
            return;
        }
        buf.clear();
        self.free.lock().push(buf);
    }

    /// Capacity of every buffer in this pool.
    pub fn buf_capacity(&self) -> usize {
        self.buf_capacity
    }

    /// Number of buffers currently waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.free.lock().len()
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("buf_capacity", &self.buf_capacity)
            .field("pooled", &self.pooled())
            .finish()
    }
}
