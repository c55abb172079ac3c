//! Predicate evaluation seam

use std::fmt;

use crate::plan::ValDescr;
use crate::scan::ScanResult;
use crate::value::{DbValue, Oid};

use super::attr_cache::{AttrCache, AttrId};

/// Three-valued predicate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    True,
    False,
    Unknown,
}

impl Logical {
    pub fn is_true(self) -> bool {
        self == Logical::True
    }
}

impl From<bool> for Logical {
    fn from(b: bool) -> Self {
        if b {
            Logical::True
        } else {
            Logical::False
        }
    }
}

/// Everything a predicate may look at for one candidate row.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub oid: Option<Oid>,
    pub class_oid: Oid,
    pub attrs: &'a AttrCache,
    /// Current value list of the cursor.
    pub values: &'a [DbValue],
    pub vd: &'a ValDescr,
}

impl<'a> RowContext<'a> {
    /// Attribute `id` of the candidate, NULL when not loaded.
    pub fn attr(&self, id: AttrId) -> &'a DbValue {
        self.attrs.get(id).unwrap_or(&DbValue::Null)
    }

    /// Slot `idx` of the value list, NULL when out of range.
    pub fn value(&self, idx: usize) -> &'a DbValue {
        self.values.get(idx).unwrap_or(&DbValue::Null)
    }
}

/// A compiled filter.
///
/// Errors abort the scan; `Unknown` rejects the row like `False` unless the
/// cursor asked for both outcomes.
pub trait Predicate: Send + Sync {
    fn eval(&self, row: &RowContext<'_>) -> ScanResult<Logical>;
}

impl<F> Predicate for F
where
    F: Fn(&RowContext<'_>) -> ScanResult<Logical> + Send + Sync,
{
    fn eval(&self, row: &RowContext<'_>) -> ScanResult<Logical> {
        self(row)
    }
}

/// Which outcome of the data filter the cursor is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qualification {
    #[default]
    Qualified,
    NotQualified,
    /// Accept either definite outcome and record which one it was.
    QualifiedOrNot,
}

impl Qualification {
    /// Decide whether a row with filter outcome `ev` is returned.
    ///
    /// In `QualifiedOrNot` mode every row is returned; a definite outcome is
    /// recorded in `self` so the caller can tell which one it got. Reset it
    /// before the next row.
    pub fn admit(&mut self, ev: Logical) -> bool {
        match *self {
            Qualification::Qualified => ev == Logical::True,
            Qualification::NotQualified => ev == Logical::False,
            Qualification::QualifiedOrNot => match ev {
                Logical::True => {
                    *self = Qualification::Qualified;
                    true
                }
                Logical::False => {
                    *self = Qualification::NotQualified;
                    true
                }
                Logical::Unknown => true,
            },
        }
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualification::Qualified => write!(f, "qualified"),
            Qualification::NotQualified => write!(f, "not qualified"),
            Qualification::QualifiedOrNot => write!(f, "qualified or not"),
        }
    }
}
