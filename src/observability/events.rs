//! Scan layer events
//!
//! Events are explicit and typed; each maps to one stable log name.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // OID buffer pool
    /// Pool created and preallocated
    PoolInit,
    /// Pool drained
    PoolShutdown,
    /// A released buffer was freed because the pool was full
    PoolBufferFreed,

    // Cursor lifecycle
    ScanOpen,
    ScanClose,

    // Index scans
    /// An optimizer-derived negative key limit was folded
    KeyLimitNormalized,
    /// Index skip scan moved to the next leading value
    IssNextValue,
    /// Top-N multi-range optimization chosen for a scan
    MroEnabled,
    /// Top-N multi-range optimization dropped at first use
    MroDisabled,
    /// Index pointed to an object the heap does not know
    InconsistentIndexEntry,

    // Heap access
    /// Page changed while waiting for a lock, row re-read
    PageVersionRetry,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::PoolInit => "OID_POOL_INIT",
            Event::PoolShutdown => "OID_POOL_SHUTDOWN",
            Event::PoolBufferFreed => "OID_POOL_BUFFER_FREED",
            Event::ScanOpen => "SCAN_OPEN",
            Event::ScanClose => "SCAN_CLOSE",
            Event::KeyLimitNormalized => "KEY_LIMIT_NORMALIZED",
            Event::IssNextValue => "ISS_NEXT_VALUE",
            Event::MroEnabled => "MRO_ENABLED",
            Event::MroDisabled => "MRO_DISABLED",
            Event::InconsistentIndexEntry => "INCONSISTENT_INDEX_ENTRY",
            Event::PageVersionRetry => "PAGE_VERSION_RETRY",
        }
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::PoolInit | Event::PoolShutdown => Severity::Info,
            Event::KeyLimitNormalized | Event::InconsistentIndexEntry => Severity::Warn,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
