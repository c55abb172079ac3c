//! Process-wide pool of OID buffers

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ScanConfig;
use crate::observability::{log_event, Event, ObservationScope, PoolMetrics};

use super::errors::{PoolError, PoolResult};
use super::oid_list::OidList;

/// Free list of reusable OID buffers.
///
/// The mutex is held only to pop or push one buffer, never while a buffer
/// is filled or allocated.
#[derive(Debug)]
pub struct OidBufferPool {
    free: Mutex<Vec<OidList>>,
    cap: usize,
    buffer_capacity: usize,
    next_id: AtomicU64,
    metrics: PoolMetrics,
}

impl OidBufferPool {
    /// Build the pool described by `config` and preallocate its buffers.
    pub fn init(config: &ScanConfig) -> PoolResult<Arc<Self>> {
        Self::with_limits(
            config.oid_buffer_capacity(),
            config.oid_pool_cap,
            config.oid_pool_prealloc,
        )
    }

    pub fn with_limits(
        buffer_capacity: usize,
        cap: usize,
        prealloc: usize,
    ) -> PoolResult<Arc<Self>> {
        if buffer_capacity == 0 {
            return Err(PoolError::invalid_capacity());
        }

        let cap_field = cap.to_string();
        let scope = ObservationScope::new(Event::PoolInit, &[("cap", cap_field.as_str())]);

        let pool = Self {
            free: Mutex::new(Vec::with_capacity(cap)),
            cap,
            buffer_capacity,
            next_id: AtomicU64::new(1),
            metrics: PoolMetrics::new(),
        };

        let count = prealloc.min(cap);
        let mut buffers = Vec::with_capacity(count);
        for _ in 0..count {
            buffers.push(pool.allocate()?);
        }
        *pool.free_list() = buffers;

        let prealloc_field = count.to_string();
        scope.complete(&[("preallocated", prealloc_field.as_str())]);

        Ok(Arc::new(pool))
    }

    fn free_list(&self) -> MutexGuard<'_, Vec<OidList>> {
        // Buffers hold plain data; a panic elsewhere cannot corrupt them.
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> PoolResult<OidList> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let list = OidList::try_new(id, self.buffer_capacity)?;
        self.metrics.increment_allocated();
        Ok(list)
    }

    /// Take a buffer from the free list, or allocate a new one.
    pub fn acquire(&self) -> PoolResult<OidList> {
        let pooled = self.free_list().pop();
        match pooled {
            Some(list) => {
                self.metrics.increment_reused();
                Ok(list)
            }
            None => self.allocate(),
        }
    }

    /// Return a buffer. It is kept only while the pool holds fewer than
    /// `cap` buffers; otherwise it is freed.
    pub fn release(&self, mut list: OidList) {
        list.clear();

        let mut free = self.free_list();
        if free.len() < self.cap {
            free.push(list);
            drop(free);
            self.metrics.increment_retained();
        } else {
            drop(free);
            self.metrics.increment_freed();
            let id = list.id().to_string();
            log_event(Event::PoolBufferFreed, &[("buffer", id.as_str())]);
        }
    }

    /// Acquire a buffer that goes back to the pool when dropped.
    pub fn checkout(self: &Arc<Self>) -> PoolResult<PooledOidList> {
        let list = self.acquire()?;
        Ok(PooledOidList {
            list,
            pool: Arc::clone(self),
        })
    }

    /// Free every pooled buffer. Returns how many were dropped.
    pub fn shutdown(&self) -> usize {
        let scope = ObservationScope::new(Event::PoolShutdown, &[]);
        let drained = std::mem::take(&mut *self.free_list()).len();
        let field = drained.to_string();
        scope.complete(&[("freed", field.as_str())]);
        drained
    }

    /// Buffers currently sitting in the free list.
    pub fn retained(&self) -> usize {
        self.free_list().len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

/// A pooled buffer owned by one scan; returned to the pool on drop.
#[derive(Debug)]
pub struct PooledOidList {
    list: OidList,
    pool: Arc<OidBufferPool>,
}

impl Deref for PooledOidList {
    type Target = OidList;

    fn deref(&self) -> &OidList {
        &self.list
    }
}

impl DerefMut for PooledOidList {
    fn deref_mut(&mut self) -> &mut OidList {
        &mut self.list
    }
}

impl Drop for PooledOidList {
    fn drop(&mut self) {
        let list = std::mem::replace(&mut self.list, OidList::detached());
        self.pool.release(list);
    }
}
