//! Shared environment of all cursors

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::plan::{DescriptorFetch, ValueFetch};
use crate::pool::OidBufferPool;

use super::heap::HeapStorage;
use super::lock::{LockManager, NoLocks};
use super::reeval::{FilterReevaluator, MvccReevaluator};

/// Configuration and collaborators shared by every cursor of a session.
///
/// Built once and passed to cursors as `Arc<ScanEnv>`.
pub struct ScanEnv {
    config: ScanConfig,
    oid_pool: Arc<OidBufferPool>,
    heap: Arc<dyn HeapStorage>,
    locks: Arc<dyn LockManager>,
    fetch: Arc<dyn ValueFetch>,
    reevaluator: Arc<dyn MvccReevaluator>,
    interrupt: Arc<AtomicBool>,
}

impl ScanEnv {
    /// An environment that takes no locks and fetches values from the
    /// value descriptor.
    pub fn new(config: ScanConfig, oid_pool: Arc<OidBufferPool>, heap: Arc<dyn HeapStorage>) -> Self {
        Self {
            config,
            oid_pool,
            heap,
            locks: Arc::new(NoLocks),
            fetch: Arc::new(DescriptorFetch),
            reevaluator: Arc::new(FilterReevaluator),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_locks(mut self, locks: Arc<dyn LockManager>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_fetch(mut self, fetch: Arc<dyn ValueFetch>) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_reevaluator(mut self, reevaluator: Arc<dyn MvccReevaluator>) -> Self {
        self.reevaluator = reevaluator;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn oid_pool(&self) -> &Arc<OidBufferPool> {
        &self.oid_pool
    }

    pub fn heap(&self) -> &dyn HeapStorage {
        self.heap.as_ref()
    }

    pub fn locks(&self) -> &dyn LockManager {
        self.locks.as_ref()
    }

    pub fn fetch(&self) -> &dyn ValueFetch {
        self.fetch.as_ref()
    }

    pub fn reevaluator(&self) -> &dyn MvccReevaluator {
        self.reevaluator.as_ref()
    }

    /// Flag another thread can raise to stop every cursor of this
    /// environment at its next `next` call.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn request_stop(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    pub fn clear_stop(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ScanEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEnv")
            .field("config", &self.config)
            .field("oid_pool", &self.oid_pool)
            .field("stop_requested", &self.stop_requested())
            .finish_non_exhaustive()
    }
}
