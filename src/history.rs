//! Bounded packet-history ring (§4.N, §5): shared with the external
//! GUI/telemetry observer, which only reads while the parser pipeline
//! appends (§9's "mutable shared history for GUI" redesign note).
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::Result;

/// Maximum entries retained per category before the oldest is evicted.
pub const CAPACITY: usize = 200;

/// A bounded, mutex-guarded ring buffer. Cloning shares the same
/// underlying storage (`Arc`), matching the "producer appends with
/// eviction, consumer snapshots" pattern.
#[derive(Clone)]
pub struct HistoryRing<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Default for HistoryRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryRing<T> {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(CAPACITY))),
        }
    }

    /// Append a value, evicting the oldest entry if at capacity.
    pub fn push(&self, value: T) -> Result<()> {
        let mut q = self.inner.lock()?;
        if q.len() >= CAPACITY {
            q.pop_front();
        }
        q.push_back(value);
        Ok(())
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.lock()?.len())
    }

    /// True if nothing is retained.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Clone> HistoryRing<T> {
    /// Snapshot the current contents, oldest first.
    pub fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.inner.lock()?.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let ring: HistoryRing<usize> = HistoryRing::new();
        for i in 0..(CAPACITY + 10) {
            ring.push(i).unwrap();
        }
        assert_eq!(ring.len().unwrap(), CAPACITY);
        let snap = ring.snapshot().unwrap();
        assert_eq!(snap[0], 10);
        assert_eq!(*snap.last().unwrap(), CAPACITY + 9);
    }

    #[test]
    fn shared_clone_sees_pushes() {
        let a: HistoryRing<&str> = HistoryRing::new();
        let b = a.clone();
        a.push("x").unwrap();
        assert_eq!(b.snapshot().unwrap(), vec!["x"]);
    }
}
