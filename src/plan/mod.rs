//! Compiled plan fragments consumed by cursors
//!
//! Everything here is produced by the plan compiler and read-only to the
//! scan layer. Values that vary per execution (host variables) live in
//! [`ValDescr`] and are fetched through a [`ValueFetch`].

mod access;
mod expr;

pub use access::{
    ClassAttrAccess, HeapAccess, HeapFileId, HeapPageAccess, IndexAccess, IndexKeyInfoAccess,
    IndexNodeInfoAccess, JsonColumn, JsonTableAccess, KeyInfo, KeyLimitOrigin, KeyRange,
    ScanAttrs, ScanPred, SetAccess, SortColumn, ValuesAccess,
};
pub use expr::{DescriptorFetch, RegExpr, ValDescr, ValueFetch};
