//! Scan cursors
//!
//! One [`ScanCursor`] per leaf access of a plan. The cursor owns the state
//! shared by every kind (status, position, direction, single-fetch flags,
//! value list, counters); each leaf kind owns only what it needs to walk
//! its source.

mod cursor;
mod errors;
mod kinds;
mod mvcc;
mod single_fetch;
mod state;

pub use cursor::{ScanCursor, ScanOptions};
pub use errors::{ScanError, ScanErrorCode, ScanResult, Severity};
pub use state::{
    ScanCode, ScanDirection, ScanOp, ScanPos, ScanPosition, ScanStatus, ScanType, SingleFetch,
};
