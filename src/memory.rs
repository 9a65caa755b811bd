//! Heap accounting for operator-owned state.
//!
//! Stateful operators report the bytes they retain through a
//! [`MemoryTracker`]. A [`ScopedMemoryTracker`] remembers everything it
//! forwarded so its owner can release the whole amount in one call at
//! teardown.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use crate::error::{CypherError, Result};
use crate::options::EvalOptions;

/// Receives heap allocation and release notifications.
pub trait MemoryTracker {
    /// Accounts `bytes` of newly retained heap memory.
    ///
    /// Returns [`CypherError::MemoryLimitExceeded`] when a budget would be exceeded;
    /// in that case nothing is accounted.
    fn allocate_heap(&self, bytes: usize) -> Result<()>;

    /// Releases `bytes` previously accounted with [`MemoryTracker::allocate_heap`].
    fn release_heap(&self, bytes: usize);

    /// Bytes currently accounted.
    fn estimated_heap_memory(&self) -> usize;
}

/// Tracker that accepts everything and remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyMemoryTracker;

impl MemoryTracker for EmptyMemoryTracker {
    fn allocate_heap(&self, _bytes: usize) -> Result<()> {
        Ok(())
    }

    fn release_heap(&self, _bytes: usize) {}

    fn estimated_heap_memory(&self) -> usize {
        0
    }
}

/// Counting tracker with an optional byte limit.
#[derive(Debug, Default)]
pub struct LocalMemoryTracker {
    used: AtomicUsize,
    peak: AtomicUsize,
    limit: Option<usize>,
}

impl LocalMemoryTracker {
    /// Creates an unlimited tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker refusing allocations beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Creates a tracker honouring [`EvalOptions::memory_limit`].
    pub fn from_options(options: &EvalOptions) -> Self {
        match options.memory_limit {
            Some(limit) => Self::with_limit(limit),
            None => Self::new(),
        }
    }

    /// Highest number of bytes ever accounted at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

impl MemoryTracker for LocalMemoryTracker {
    fn allocate_heap(&self, bytes: usize) -> Result<()> {
        let used = self.used.load(Ordering::Relaxed);
        let next = used.saturating_add(bytes);
        if let Some(limit) = self.limit {
            if next > limit {
                warn!(requested = bytes, used, limit, "memory.limit_exceeded");
                return Err(CypherError::MemoryLimitExceeded {
                    requested: bytes,
                    used,
                    limit,
                });
            }
        }
        self.used.store(next, Ordering::Relaxed);
        self.peak.fetch_max(next, Ordering::Relaxed);
        Ok(())
    }

    fn release_heap(&self, bytes: usize) {
        let used = self.used.load(Ordering::Relaxed);
        self.used.store(used.saturating_sub(bytes), Ordering::Relaxed);
    }

    fn estimated_heap_memory(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

/// Tracker forwarding to a parent while remembering its own share.
///
/// [`ScopedMemoryTracker::close`] releases everything this scope accounted.
/// Dropping the scope closes it as well.
pub struct ScopedMemoryTracker<'a> {
    parent: &'a dyn MemoryTracker,
    tracked: AtomicUsize,
}

impl<'a> ScopedMemoryTracker<'a> {
    /// Opens a scope over `parent`.
    pub fn new(parent: &'a dyn MemoryTracker) -> Self {
        Self {
            parent,
            tracked: AtomicUsize::new(0),
        }
    }

    /// Releases every byte this scope still holds.
    pub fn close(&self) {
        let held = self.tracked.swap(0, Ordering::Relaxed);
        if held > 0 {
            self.parent.release_heap(held);
        }
    }
}

impl MemoryTracker for ScopedMemoryTracker<'_> {
    fn allocate_heap(&self, bytes: usize) -> Result<()> {
        self.parent.allocate_heap(bytes)?;
        self.tracked.fetch_add(bytes, Ordering::Relaxed);
        Ok(())
    }

    fn release_heap(&self, bytes: usize) {
        let held = self.tracked.load(Ordering::Relaxed);
        let released = bytes.min(held);
        self.tracked.store(held - released, Ordering::Relaxed);
        self.parent.release_heap(released);
    }

    fn estimated_heap_memory(&self) -> usize {
        self.tracked.load(Ordering::Relaxed)
    }
}

impl Drop for ScopedMemoryTracker<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
