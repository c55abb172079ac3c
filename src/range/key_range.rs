//! Evaluated key ranges

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::{RangeKind, RangeOp};
use crate::value::{Collation, DbValue};

/// How the key ranges of one index access are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeShape {
    /// One equality key.
    Key,
    /// One range.
    Range,
    /// A list of equality keys.
    KeyList,
    /// A list of ranges.
    RangeList,
}

impl RangeShape {
    pub fn is_list(self) -> bool {
        matches!(self, RangeShape::KeyList | RangeShape::RangeList)
    }

    pub fn is_key(self) -> bool {
        matches!(self, RangeShape::Key | RangeShape::KeyList)
    }
}

/// Concrete bounds of one range, evaluated from plan expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValRange {
    pub kind: RangeKind,
    pub key1: DbValue,
    pub key2: DbValue,
    /// A prefix-length index shortened a string bound.
    pub is_truncated: bool,
    /// Significant columns in composite bounds, 0 when bounds are scalar.
    pub num_index_term: usize,
}

impl KeyValRange {
    pub fn new(kind: RangeKind, key1: DbValue, key2: DbValue) -> Self {
        Self {
            kind,
            key1,
            key2,
            is_truncated: false,
            num_index_term: 0,
        }
    }

    /// A single key `key = value`.
    pub fn key(value: DbValue) -> Self {
        Self::new(RangeKind::Eq, value.clone(), value)
    }

    pub fn na() -> Self {
        Self::new(RangeKind::Na, DbValue::Null, DbValue::Null)
    }

    pub fn unbounded() -> Self {
        Self::new(RangeKind::InfInf, DbValue::Null, DbValue::Null)
    }

    pub fn with_terms(mut self, num_index_term: usize) -> Self {
        self.num_index_term = num_index_term;
        self
    }

    pub fn is_na(&self) -> bool {
        self.kind == RangeKind::Na
    }

    pub fn lower(&self) -> (&DbValue, RangeOp) {
        (&self.key1, self.kind.to_ops().0)
    }

    pub fn upper(&self) -> (&DbValue, RangeOp) {
        (&self.key2, self.kind.to_ops().1)
    }

    fn significant_columns(&self) -> usize {
        if self.num_index_term == 0 {
            usize::MAX
        } else {
            self.num_index_term
        }
    }

    /// Whether `key` falls inside this range.
    ///
    /// Composite keys only compare their first `num_index_term` columns.
    pub fn contains(&self, key: &DbValue, collation: Collation) -> bool {
        let columns = self.significant_columns();
        let cmp = |bound: &DbValue| key.compare_columns(bound, columns, collation);

        if self.kind == RangeKind::Eq {
            return cmp(&self.key1) == Some(Ordering::Equal);
        }

        let (lower_op, upper_op) = self.kind.to_ops();
        let lower_ok = match lower_op {
            RangeOp::GtInf => true,
            RangeOp::Ge => matches!(cmp(&self.key1), Some(Ordering::Greater | Ordering::Equal)),
            RangeOp::Gt => cmp(&self.key1) == Some(Ordering::Greater),
            _ => false,
        };
        if !lower_ok {
            return false;
        }

        match upper_op {
            RangeOp::LtInf => true,
            RangeOp::Le => matches!(cmp(&self.key2), Some(Ordering::Less | Ordering::Equal)),
            RangeOp::Lt => cmp(&self.key2) == Some(Ordering::Less),
            _ => false,
        }
    }
}

impl fmt::Display for KeyValRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lower, upper) = self.kind.to_ops();
        match self.kind {
            RangeKind::Na => write!(f, "NA"),
            RangeKind::Eq => write!(f, "[{}]", self.key1),
            _ => {
                match lower {
                    RangeOp::Ge => write!(f, "[{}", self.key1)?,
                    RangeOp::Gt => write!(f, "({}", self.key1)?,
                    _ => write!(f, "(-inf")?,
                }
                match upper {
                    RangeOp::Le => write!(f, ",{}]", self.key2),
                    RangeOp::Lt => write!(f, ",{})", self.key2),
                    _ => write!(f, ",+inf)"),
                }
            }
        }
    }
}
