//! Typed values flowing through scans
//!
//! Values compare by domain rather than by representation:
//! - integers and doubles share one numeric order
//! - NULL sorts before every non-null value, two NULLs are equal
//! - composite index keys (midxkeys) compare column by column, up to a
//!   declared number of significant columns
//!
//! Comparison returns `None` when two values are incomparable (for example
//! a string against an integer). Callers in the range algebra treat that
//! as "not applicable" rather than as an error.

mod db_value;
mod domain;

pub use db_value::{Collation, DbType, DbValue, Oid};
pub use domain::{coerce_to_bigint, truncate_prefix, CoerceError};
