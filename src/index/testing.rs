//! In-memory index for unit tests

use std::cmp::Ordering;

use crate::collab::{BtreeIndex, IndexEntry, IndexInfo};
use crate::range::KeyValRange;
use crate::scan::ScanResult;
use crate::value::{Collation, DbValue, Oid};

pub fn int_key(v: i32) -> DbValue {
    DbValue::Integer(v)
}

pub fn pair_key(a: i32, b: i32) -> DbValue {
    DbValue::Midxkey(vec![DbValue::Integer(a), DbValue::Integer(b)])
}

/// Entries kept in traversal order.
pub struct VecIndex {
    info: IndexInfo,
    entries: Vec<IndexEntry>,
}

impl VecIndex {
    pub fn new(info: IndexInfo, mut entries: Vec<IndexEntry>) -> Self {
        let desc = info.desc_columns.clone();
        entries.sort_by(|a, b| traversal_order(&desc, &a.key, &b.key));
        Self { info, entries }
    }

    pub fn scalar(entries: impl IntoIterator<Item = (i32, Vec<Oid>)>) -> Self {
        Self::new(
            IndexInfo::new("i_scalar", vec![0]),
            entries
                .into_iter()
                .map(|(k, oids)| IndexEntry::new(int_key(k), oids))
                .collect(),
        )
    }
}

fn traversal_order(desc: &[bool], a: &DbValue, b: &DbValue) -> Ordering {
    let width = match (a, b) {
        (DbValue::Midxkey(x), DbValue::Midxkey(y)) => x.len().max(y.len()),
        _ => 1,
    };
    for col in 0..width {
        let (Some(x), Some(y)) = (a.column(col), b.column(col)) else {
            continue;
        };
        let ord = x.total_cmp(y, Collation::Strict);
        let ord = if desc.get(col).copied().unwrap_or(false) {
            ord.reverse()
        } else {
            ord
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl BtreeIndex for VecIndex {
    fn info(&self) -> &IndexInfo {
        &self.info
    }

    fn next_key(
        &self,
        range: &KeyValRange,
        after: Option<&DbValue>,
        reverse: bool,
    ) -> ScanResult<Option<IndexEntry>> {
        let desc = &self.info.desc_columns;
        let past = |key: &DbValue| match after {
            None => true,
            Some(prev) => {
                let ord = traversal_order(desc, key, prev);
                if reverse {
                    ord == Ordering::Less
                } else {
                    ord == Ordering::Greater
                }
            }
        };
        let hit = |e: &&IndexEntry| past(&e.key) && range.contains(&e.key, Collation::Strict);

        let found = if reverse {
            self.entries.iter().rev().find(hit)
        } else {
            self.entries.iter().find(hit)
        };
        Ok(found.cloned())
    }

    fn key_info(&self, key: &DbValue) -> ScanResult<Option<Vec<DbValue>>> {
        Ok(self.entries.iter().find(|e| e.key.strict_eq(key)).map(|e| {
            vec![e.key.clone(), DbValue::BigInt(e.oids.len() as i64)]
        }))
    }

    fn node_info(&self) -> ScanResult<Vec<Vec<DbValue>>> {
        Ok(vec![vec![DbValue::string("leaf"), DbValue::BigInt(self.entries.len() as i64)]])
    }
}
