use std::{
    ops::Deref,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crossbeam::queue::ArrayQueue;

/// Fixed-capacity pool of payload buffers. Buffers returned while the pool
/// is full, or that grew past `max_buffer_bytes`, are simply dropped.
pub struct BufferPool {
    buffers: ArrayQueue<Vec<u8>>,
    max_buffer_bytes: usize,
    in_use: AtomicUsize,
}

impl BufferPool {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize, max_buffer_bytes: usize) -> Arc<Self> {
        Arc::new(Self {
            buffers: ArrayQueue::new(capacity.max(1)),
            max_buffer_bytes,
            in_use: AtomicUsize::new(0),
        })
    }

    /// Copies `bytes` into a pooled buffer
    pub fn take(self: &Arc<Self>, bytes: &[u8]) -> PooledBuffer {
        let mut buffer = self.buffers.pop().unwrap_or_default();
        buffer.extend_from_slice(bytes);
        self.in_use.fetch_add(1, Ordering::Relaxed);
        PooledBuffer {
            buffer,
            pool: Arc::clone(self),
        }
    }

    fn give_back(&self, mut buffer: Vec<u8>) {
        self.in_use.fetch_sub(1, Ordering::Relaxed);
        if buffer.capacity() > self.max_buffer_bytes {
            return;
        }
        buffer.clear();
        // full pool: let the buffer drop
        let _ = self.buffers.push(buffer);
    }

    /// Buffers currently idle in the pool
    pub fn available(&self) -> usize {
        self.buffers.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffers.capacity()
    }

    /// Buffers handed out and not yet returned
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }
}

/// A payload copy that returns its allocation to the pool when dropped
pub struct PooledBuffer {
    buffer: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buffer));
    }
}
