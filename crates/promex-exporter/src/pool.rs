use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex},
};

pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Free list of response buffers reused across scrapes.
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    capacity: usize,
    idle: Mutex<Vec<String>>,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                capacity,
                idle: Mutex::new(Vec::with_capacity(capacity)),
            }),
        }
    }

    /// Hands out an empty buffer; it goes back to the pool when dropped.
    pub fn get(&self) -> PooledBuffer {
        let buffer = self
            .inner
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_default();

        PooledBuffer {
            buffer,
            pool: Arc::clone(&self.inner),
        }
    }

    pub fn idle(&self) -> usize {
        self.inner.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

pub struct PooledBuffer {
    buffer: String,
    pool: Arc<PoolInner>,
}

impl Deref for PooledBuffer {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.clear();
        if let Ok(mut idle) = self.pool.idle.lock()
            && idle.len() < self.pool.capacity
        {
            idle.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BufferPool;

    #[test]
    fn dropped_buffer_is_reused_empty() {
        let pool = BufferPool::new(2);
        {
            let mut buffer = pool.get();
            buffer.push_str("# HELP x metric\n");
            buffer.reserve(4096);
        }
        assert_eq!(pool.idle(), 1);

        let buffer = pool.get();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 4096);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn pool_keeps_at_most_capacity_buffers() {
        let pool = BufferPool::new(1);
        let first = pool.get();
        let second = pool.get();
        drop(first);
        drop(second);

        assert_eq!(pool.idle(), 1);
    }
}
