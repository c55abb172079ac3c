//! Compiled access plans
//!
//! Read-only plan pieces handed to a cursor at open time. A cursor never
//! mutates them; values that change per execution come from the value
//! descriptor.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::filter::{AttrId, Predicate};
use crate::range::{RangeKind, RangeShape};
use crate::value::Oid;

use super::expr::RegExpr;

/// Optional predicate handle of one filter stage.
#[derive(Clone, Default)]
pub struct ScanPred {
    predicate: Option<Arc<dyn Predicate>>,
}

impl ScanPred {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(predicate: impl Predicate + 'static) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn is_none(&self) -> bool {
        self.predicate.is_none()
    }

    pub fn predicate(&self) -> Option<&dyn Predicate> {
        self.predicate.as_deref()
    }
}

impl fmt::Debug for ScanPred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predicate {
            Some(_) => write!(f, "ScanPred(<predicate>)"),
            None => write!(f, "ScanPred(none)"),
        }
    }
}

/// Attributes a filter stage or an output list needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanAttrs {
    pub attr_ids: Vec<AttrId>,
}

impl ScanAttrs {
    pub fn new(attr_ids: Vec<AttrId>) -> Self {
        Self { attr_ids }
    }

    pub fn len(&self) -> usize {
        self.attr_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attr_ids.is_empty()
    }
}

/// One compiled key range; bounds are evaluated at scan start.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRange {
    pub kind: RangeKind,
    pub key1: Option<RegExpr>,
    pub key2: Option<RegExpr>,
}

impl KeyRange {
    pub fn new(kind: RangeKind, key1: Option<RegExpr>, key2: Option<RegExpr>) -> Self {
        Self { kind, key1, key2 }
    }

    pub fn eq(key: RegExpr) -> Self {
        Self::new(RangeKind::Eq, Some(key), None)
    }

    pub fn all() -> Self {
        Self::new(RangeKind::InfInf, None, None)
    }
}

/// Who wrote a key limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyLimitOrigin {
    /// Written in the statement; negative values are errors.
    #[default]
    User,
    /// Computed by the optimizer; negative values are normalized.
    Derived,
}

/// Key ranges and pagination of one index access.
#[derive(Debug, Clone, Default)]
pub struct KeyInfo {
    pub ranges: Vec<KeyRange>,
    /// OIDs to skip.
    pub limit_lower: Option<RegExpr>,
    /// Most OIDs to return.
    pub limit_upper: Option<RegExpr>,
    pub limit_origin: KeyLimitOrigin,
    /// Re-evaluate the upper limit before each key of a key list.
    pub limit_reset: bool,
    /// Leading index column is left unbound for index skip scan.
    pub use_iss: bool,
}

impl KeyInfo {
    pub fn new(ranges: Vec<KeyRange>) -> Self {
        Self {
            ranges,
            ..Self::default()
        }
    }

    pub fn with_limits(
        mut self,
        lower: Option<RegExpr>,
        upper: Option<RegExpr>,
        origin: KeyLimitOrigin,
    ) -> Self {
        self.limit_lower = lower;
        self.limit_upper = upper;
        self.limit_origin = origin;
        self
    }
}

/// One column of the top-N sort order, as an index key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortColumn {
    pub column: usize,
    pub descending: bool,
}

impl SortColumn {
    pub fn asc(column: usize) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn desc(column: usize) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// Index access of one index scan.
#[derive(Debug, Clone)]
pub struct IndexAccess {
    pub class_oid: Oid,
    pub shape: RangeShape,
    pub key_info: KeyInfo,
    /// Walk the index backwards.
    pub use_desc_index: bool,
    /// A descending ORDER BY or GROUP BY is satisfied by the backward walk;
    /// key lists are reversed to match.
    pub descending_skip: bool,
    /// Covering projection: value list slot `i` is key column `covering[i]`.
    pub covering: Option<Vec<usize>>,
    /// Top-N order for the multi-range optimization.
    pub mro_sort: Vec<SortColumn>,
    pub range_pred: ScanPred,
    pub range_attrs: ScanAttrs,
    pub key_pred: ScanPred,
    pub key_attrs: ScanAttrs,
    pub data_pred: ScanPred,
    pub data_attrs: ScanAttrs,
    /// Output: value list slot `i` is record attribute `rest_attrs[i]`.
    pub rest_attrs: ScanAttrs,
}

impl IndexAccess {
    pub fn new(class_oid: Oid, shape: RangeShape, key_info: KeyInfo) -> Self {
        Self {
            class_oid,
            shape,
            key_info,
            use_desc_index: false,
            descending_skip: false,
            covering: None,
            mro_sort: Vec::new(),
            range_pred: ScanPred::none(),
            range_attrs: ScanAttrs::default(),
            key_pred: ScanPred::none(),
            key_attrs: ScanAttrs::default(),
            data_pred: ScanPred::none(),
            data_attrs: ScanAttrs::default(),
            rest_attrs: ScanAttrs::default(),
        }
    }

    pub fn is_covering(&self) -> bool {
        self.covering.is_some()
    }

    /// Width of the value list this access fills.
    pub fn output_width(&self) -> usize {
        match &self.covering {
            Some(cols) => cols.len(),
            None => self.rest_attrs.len(),
        }
    }
}

/// Heap file identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeapFileId(pub u32);

impl fmt::Display for HeapFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hfid:{}", self.0)
    }
}

/// Sequential heap scan.
#[derive(Debug, Clone)]
pub struct HeapAccess {
    pub hfid: HeapFileId,
    pub class_oid: Oid,
    pub pred: ScanPred,
    pub pred_attrs: ScanAttrs,
    pub rest_attrs: ScanAttrs,
}

impl HeapAccess {
    pub fn new(hfid: HeapFileId, class_oid: Oid, rest_attrs: ScanAttrs) -> Self {
        Self {
            hfid,
            class_oid,
            pred: ScanPred::none(),
            pred_attrs: ScanAttrs::default(),
            rest_attrs,
        }
    }
}

/// One row per heap page, built from the page header.
#[derive(Debug, Clone)]
pub struct HeapPageAccess {
    pub hfid: HeapFileId,
    pub pred: ScanPred,
}

/// Single row holding the attribute values stored for a class object.
#[derive(Debug, Clone)]
pub struct ClassAttrAccess {
    pub class_oid: Oid,
    pub pred: ScanPred,
    pub pred_attrs: ScanAttrs,
    pub rest_attrs: ScanAttrs,
}

/// Statistics row for one key of an index.
#[derive(Debug, Clone)]
pub struct IndexKeyInfoAccess {
    pub key: RegExpr,
    pub pred: ScanPred,
}

/// One row per index node.
#[derive(Debug, Clone, Default)]
pub struct IndexNodeInfoAccess {
    pub pred: ScanPred,
}

/// Scan over rows of expressions.
#[derive(Debug, Clone, Default)]
pub struct ValuesAccess {
    pub rows: Vec<Vec<RegExpr>>,
}

/// Scan over the elements of a set value or a literal sequence.
#[derive(Debug, Clone)]
pub struct SetAccess {
    pub set: RegExpr,
    pub pred: ScanPred,
}

/// One output column of a JSON table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonColumn {
    pub name: String,
    /// Member names and array positions walked from each row object.
    pub path: Vec<String>,
    /// Emit the 1-based row number instead of a value.
    #[serde(default)]
    pub ordinality: bool,
}

/// Scan that expands a JSON document into rows.
#[derive(Debug, Clone)]
pub struct JsonTableAccess {
    pub document: RegExpr,
    /// Path from the document root to the array (or object) of rows.
    pub row_path: Vec<String>,
    pub columns: Vec<JsonColumn>,
    pub pred: ScanPred,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Logical, RowContext};
    use crate::scan::ScanResult;

    #[test]
    fn test_scan_pred_debug() {
        let pred = ScanPred::new(|_: &RowContext<'_>| -> ScanResult<Logical> { Ok(Logical::True) });
        assert!(!pred.is_none());
        assert_eq!(format!("{:?}", pred), "ScanPred(<predicate>)");
        assert_eq!(format!("{:?}", ScanPred::none()), "ScanPred(none)");
    }

    #[test]
    fn test_index_access_output_width() {
        let mut access = IndexAccess::new(
            Oid::new(0, 1, 1),
            RangeShape::Range,
            KeyInfo::new(vec![KeyRange::all()]),
        );
        access.rest_attrs = ScanAttrs::new(vec![0, 1, 2]);
        assert_eq!(access.output_width(), 3);

        access.covering = Some(vec![0]);
        assert!(access.is_covering());
        assert_eq!(access.output_width(), 1);
    }

    #[test]
    fn test_key_info_limits() {
        let info = KeyInfo::new(vec![KeyRange::eq(RegExpr::constant(1))]).with_limits(
            None,
            Some(RegExpr::constant(5)),
            KeyLimitOrigin::Derived,
        );
        assert_eq!(info.limit_origin, KeyLimitOrigin::Derived);
        assert!(info.limit_lower.is_none());
        assert_eq!(info.ranges[0].kind, RangeKind::Eq);
    }

    #[test]
    fn test_json_column_deserialize() {
        let col: JsonColumn =
            serde_json::from_str(r#"{"name":"a","path":["x","0"]}"#).unwrap();
        assert!(!col.ordinality);
        assert_eq!(col.path, vec!["x", "0"]);
    }
}
