//! B-tree search seam

use crate::filter::AttrId;
use crate::range::KeyValRange;
use crate::scan::ScanResult;
use crate::value::{DbValue, Oid};

/// Static description of an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub name: String,
    /// Attribute stored in each key column.
    pub attr_ids: Vec<AttrId>,
    /// Per key column, true when the column is ordered descending.
    pub desc_columns: Vec<bool>,
    /// String keys are stored truncated to this many characters.
    pub prefix_length: Option<usize>,
    /// Key columns holding variable-length strings.
    pub vstr_columns: Vec<usize>,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>, attr_ids: Vec<AttrId>) -> Self {
        let desc_columns = vec![false; attr_ids.len()];
        Self {
            name: name.into(),
            attr_ids,
            desc_columns,
            prefix_length: None,
            vstr_columns: Vec::new(),
        }
    }

    pub fn with_desc_columns(mut self, desc_columns: Vec<bool>) -> Self {
        self.desc_columns = desc_columns;
        self
    }

    pub fn with_prefix_length(mut self, len: usize) -> Self {
        self.prefix_length = Some(len);
        self
    }

    pub fn with_vstr_columns(mut self, cols: Vec<usize>) -> Self {
        self.vstr_columns = cols;
        self
    }

    pub fn num_attrs(&self) -> usize {
        self.attr_ids.len()
    }

    pub fn leading_desc(&self) -> bool {
        self.desc_columns.first().copied().unwrap_or(false)
    }
}

/// One key of the index with the objects it points to.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: DbValue,
    pub oids: Vec<Oid>,
}

impl IndexEntry {
    pub fn new(key: DbValue, oids: Vec<Oid>) -> Self {
        Self { key, oids }
    }
}

/// An ordered index the scan layer reads through.
///
/// Traversal order follows the per-column directions in [`IndexInfo`];
/// `reverse` walks it from the end.
pub trait BtreeIndex: Send + Sync {
    fn info(&self) -> &IndexInfo;

    /// First entry inside `range` that comes after `after` in traversal
    /// order, or the first entry of the range when `after` is `None`.
    fn next_key(
        &self,
        range: &KeyValRange,
        after: Option<&DbValue>,
        reverse: bool,
    ) -> ScanResult<Option<IndexEntry>>;

    /// Statistics row for `key`, `None` when the key is absent.
    fn key_info(&self, key: &DbValue) -> ScanResult<Option<Vec<DbValue>>>;

    /// One descriptive row per index node.
    fn node_info(&self) -> ScanResult<Vec<Vec<DbValue>>>;
}
