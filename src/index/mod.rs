//! Index scan driver
//!
//! - `key_limit`: lower/upper key-limit evaluation and per-OID accounting
//! - `search`: one resumable B-tree range search with key filtering
//! - `skip_scan`: index skip scan over distinct leading values
//! - `multi_range`: bounded top-N buffer across key-list entries
//! - `driver`: range materialization and batching for a cursor

mod driver;
mod key_limit;
mod multi_range;
mod search;
mod skip_scan;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{IndexHit, IndexScanDriver};
pub use key_limit::{KeyLimits, LimitDecision};
pub use multi_range::{MultiRangeOpt, TopNItem};
pub use search::{range_search, BtreeScan, CoveredRow, KeyFilter, SearchSink};
pub use skip_scan::{IndexSkipScan, IssOp};
