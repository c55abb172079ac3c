//! OID buffer pool counters
//!
//! - Counters only, monotonic
//! - Relaxed atomics; exact values are only meaningful once threads settle

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters kept by one [`crate::pool::OidBufferPool`].
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Buffers created by the allocator
    allocated: AtomicU64,
    /// Acquires served from the free list
    reused: AtomicU64,
    /// Releases that went back into the free list
    retained: AtomicU64,
    /// Releases dropped because the pool was at capacity
    freed: AtomicU64,
}

/// Point-in-time copy of [`PoolMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolMetricsSnapshot {
    pub allocated: u64,
    pub reused: u64,
    pub retained: u64,
    pub freed: u64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_allocated(&self) {
        self.allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retained(&self) {
        self.retained.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_freed(&self) {
        self.freed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            retained: self.retained.load(Ordering::Relaxed),
            freed: self.freed.load(Ordering::Relaxed),
        }
    }
}
