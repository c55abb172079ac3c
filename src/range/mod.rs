//! Key range algebra
//!
//! Turns the evaluated key ranges of one index access into a minimal,
//! sorted list that the index scan driver can search one entry at a time.
//!
//! # Invariants
//!
//! - After merging, usable ranges are pairwise disjoint and sorted by their
//!   lower bound
//! - The union of values covered by the list never changes
//! - Key list deduplication compares strings with trailing whitespace
//!   significant, whatever collation the rest of the scan uses
//! - `Na` ranges are never searched but keep their slot in the list

mod algebra;
mod key_range;
mod kind;

pub use algebra::{canonicalize, compare_endpoints, dedup_keys, merge_ranges};
pub use key_range::{KeyValRange, RangeShape};
pub use kind::{EndpointOrder, RangeKind, RangeOp};
