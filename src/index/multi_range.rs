//! Top-N buffer of the multi-range optimization
//!
//! Keeps the best `size` (key, OID) pairs seen across every sub-range of a
//! key list. Items stay sorted by the configured key columns; ties keep
//! arrival order.

use std::cmp::Ordering;

use crate::plan::SortColumn;
use crate::value::{Collation, DbValue, Oid};

#[derive(Debug, Clone, PartialEq)]
pub struct TopNItem {
    pub key: DbValue,
    pub oid: Oid,
}

#[derive(Debug, Clone)]
pub struct MultiRangeOpt {
    enabled: bool,
    size: usize,
    items: Vec<TopNItem>,
    sort: Vec<SortColumn>,
    collation: Collation,
}

impl MultiRangeOpt {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            size: 0,
            items: Vec::new(),
            sort: Vec::new(),
            collation: Collation::default(),
        }
    }

    pub fn new(size: usize, sort: Vec<SortColumn>, collation: Collation) -> Self {
        Self {
            enabled: true,
            size,
            items: Vec::with_capacity(size),
            sort,
            collation,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.items.clear();
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[TopNItem] {
        &self.items
    }

    pub fn get(&self, idx: usize) -> Option<&TopNItem> {
        self.items.get(idx)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Order two keys by the sort columns.
    fn compare(&self, a: &DbValue, b: &DbValue) -> Ordering {
        for col in &self.sort {
            let (Some(x), Some(y)) = (a.column(col.column), b.column(col.column)) else {
                continue;
            };
            let ord = x.total_cmp(y, self.collation);
            let ord = if col.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Offer a candidate. Returns whether it was kept.
    pub fn consider(&mut self, key: &DbValue, oid: Oid) -> bool {
        if self.size == 0 {
            return false;
        }

        if self.items.len() == self.size {
            let worst = &self.items[self.size - 1];
            if self.compare(key, &worst.key) != Ordering::Less {
                return false;
            }
        }

        let pos = self
            .items
            .partition_point(|it| self.compare(&it.key, key) != Ordering::Greater);
        self.items.insert(
            pos,
            TopNItem {
                key: key.clone(),
                oid,
            },
        );
        self.items.truncate(self.size);
        true
    }
}
