//! One B-tree range search
//!
//! [`range_search`] walks the keys of one range through a [`BtreeIndex`],
//! applies the key filter and key limits, and hands each surviving OID to
//! a [`SearchSink`]. When the sink fills up in the middle of a key the
//! position is kept in the [`BtreeScan`] and the next call resumes there.

use crate::collab::{BtreeIndex, IndexEntry};
use crate::filter::{AttrCache, FilterInfo};
use crate::observability::ScanStats;
use crate::plan::ValDescr;
use crate::pool::OidList;
use crate::range::KeyValRange;
use crate::scan::ScanResult;
use crate::value::{DbValue, Oid};

use super::key_limit::{KeyLimits, LimitDecision};
use super::multi_range::MultiRangeOpt;

/// Position of a range search inside the index.
#[derive(Debug, Clone, Default)]
pub struct BtreeScan {
    pub use_desc_index: bool,
    last_key: Option<DbValue>,
    pending: Option<(IndexEntry, usize)>,
    end_of_scan: bool,
}

impl BtreeScan {
    pub fn new(use_desc_index: bool) -> Self {
        Self {
            use_desc_index,
            ..Self::default()
        }
    }

    /// Forget the position; the next search starts at the range boundary.
    pub fn restart(&mut self) {
        self.last_key = None;
        self.pending = None;
        self.end_of_scan = false;
    }

    pub fn is_end_of_scan(&self) -> bool {
        self.end_of_scan
    }

    pub fn last_key(&self) -> Option<&DbValue> {
        self.last_key.as_ref()
    }
}

/// A covering-index result: the key carries every projected column.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveredRow {
    pub key: DbValue,
    pub oid: Oid,
}

/// Where a search puts what it finds.
pub enum SearchSink<'a> {
    /// OID buffer; the search pauses when it is full.
    Oids(&'a mut OidList),
    /// Covering rows; the search pauses at `limit`.
    Covered {
        rows: &'a mut Vec<CoveredRow>,
        limit: usize,
    },
    /// Top-N buffer; the search always runs to the end of the range.
    TopN(&'a mut MultiRangeOpt),
    /// Only the first key; the search ends after it.
    FirstKey(&'a mut Option<DbValue>),
}

enum SinkState {
    Open,
    Full,
    Done,
}

impl SearchSink<'_> {
    fn accept(&mut self, key: &DbValue, oid: Oid) -> SinkState {
        match self {
            SearchSink::Oids(list) => {
                list.push(oid);
                if list.is_full() {
                    SinkState::Full
                } else {
                    SinkState::Open
                }
            }
            SearchSink::Covered { rows, limit } => {
                rows.push(CoveredRow {
                    key: key.clone(),
                    oid,
                });
                if rows.len() >= *limit {
                    SinkState::Full
                } else {
                    SinkState::Open
                }
            }
            SearchSink::TopN(mro) => {
                mro.consider(key, oid);
                SinkState::Open
            }
            SearchSink::FirstKey(slot) => {
                **slot = Some(key.clone());
                SinkState::Done
            }
        }
    }
}

/// Range and key filters of an index scan with their evaluation context.
///
/// Both run on the key columns; a key is read only if both are true.
pub struct KeyFilter<'a> {
    pub range: Option<FilterInfo<'a>>,
    pub key: Option<FilterInfo<'a>>,
    pub cache: &'a mut AttrCache,
    pub values: &'a [DbValue],
    pub vd: &'a ValDescr,
}

impl KeyFilter<'_> {
    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.key.is_none()
    }

    fn passes(&mut self, key: &DbValue) -> ScanResult<bool> {
        for info in [&self.range, &self.key].into_iter().flatten() {
            if !info.eval_key(self.cache, key, self.values, self.vd)?.is_true() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Run (or resume) a search of `range`. Returns how many OIDs went to the
/// sink; `scan.is_end_of_scan()` tells whether the range is exhausted.
///
/// Calling it again after the end of the range starts over.
pub fn range_search(
    index: &dyn BtreeIndex,
    scan: &mut BtreeScan,
    range: &KeyValRange,
    mut key_filter: Option<&mut KeyFilter<'_>>,
    mut limits: Option<&mut KeyLimits>,
    sink: &mut SearchSink<'_>,
    stats: &mut ScanStats,
) -> ScanResult<usize> {
    if scan.end_of_scan {
        scan.restart();
    }

    let mut produced = 0;
    loop {
        if limits.as_deref().is_some_and(KeyLimits::exhausted) {
            scan.end_of_scan = true;
            return Ok(produced);
        }

        let (entry, start) = match scan.pending.take() {
            Some(pending) => pending,
            None => {
                let next = index.next_key(range, scan.last_key.as_ref(), scan.use_desc_index)?;
                stats.fetches += 1;
                let Some(entry) = next else {
                    scan.end_of_scan = true;
                    return Ok(produced);
                };
                scan.last_key = Some(entry.key.clone());
                stats.read_keys += 1;

                if let Some(filter) = key_filter.as_deref_mut() {
                    if !filter.passes(&entry.key)? {
                        continue;
                    }
                }
                stats.qualified_keys += 1;
                (entry, 0)
            }
        };

        for pos in start..entry.oids.len() {
            if let Some(limits) = limits.as_deref_mut() {
                match limits.admit() {
                    LimitDecision::Skip => continue,
                    LimitDecision::Stop => {
                        scan.end_of_scan = true;
                        return Ok(produced);
                    }
                    LimitDecision::Emit => {}
                }
            }

            let state = sink.accept(&entry.key, entry.oids[pos]);
            produced += 1;
            match state {
                SinkState::Open => {}
                SinkState::Full => {
                    if pos + 1 < entry.oids.len() {
                        scan.pending = Some((entry, pos + 1));
                    }
                    return Ok(produced);
                }
                SinkState::Done => {
                    scan.end_of_scan = true;
                    return Ok(produced);
                }
            }
        }
    }
}
