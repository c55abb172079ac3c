//! Filter stages and the attribute cache
//!
//! An index scan runs up to three filters: the range filter and the key
//! filter see index key columns, the data filter sees heap attributes.
//! Each stage is a [`FilterInfo`] borrowing its predicate from the plan and
//! its [`AttrCache`] from the cursor.

mod attr_cache;
mod filter_info;
mod predicate;

pub use attr_cache::{AttrCache, AttrId};
pub use filter_info::FilterInfo;
pub use predicate::{Logical, Predicate, Qualification, RowContext};
