//! Object lock seam

use crate::scan::ScanResult;
use crate::value::Oid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// Fail with `WouldBlock` instead of waiting.
    Conditional,
    /// Wait until granted or the wait is aborted.
    Unconditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Granted,
    WouldBlock,
}

pub trait LockManager: Send + Sync {
    fn lock(&self, oid: Oid, class_oid: Oid, mode: LockMode, wait: LockWait)
        -> ScanResult<LockOutcome>;
}

/// Grants every request. For read-only environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocks;

impl LockManager for NoLocks {
    fn lock(&self, _: Oid, _: Oid, _: LockMode, _: LockWait) -> ScanResult<LockOutcome> {
        Ok(LockOutcome::Granted)
    }
}
