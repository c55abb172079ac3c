//! Index scan driver
//!
//! Turns the compiled key ranges of one index access into B-tree searches
//! and collects their results: OIDs in a pooled buffer, covered rows, or
//! the top-N buffer of the multi-range optimization.

use std::sync::Arc;

use crate::collab::{BtreeIndex, IndexInfo, ScanEnv};
use crate::filter::{AttrCache, FilterInfo};
use crate::observability::{log_event, Event, ScanStats};
use crate::plan::{IndexAccess, KeyRange, RegExpr, ScanAttrs, ScanPred, ValDescr, ValueFetch};
use crate::pool::PooledOidList;
use crate::range::{canonicalize, KeyValRange, RangeKind, RangeShape};
use crate::scan::{ScanCode, ScanError, ScanResult};
use crate::value::{truncate_prefix, Collation, DbValue, Oid};

use super::key_limit::KeyLimits;
use super::multi_range::MultiRangeOpt;
use super::search::{range_search, BtreeScan, CoveredRow, KeyFilter, SearchSink};
use super::skip_scan::IndexSkipScan;

/// One result of the current batch.
#[derive(Debug, Clone, Copy)]
pub struct IndexHit<'a> {
    pub oid: Oid,
    /// Index key, present for covered and top-N results.
    pub key: Option<&'a DbValue>,
}

pub struct IndexScanDriver {
    access: Arc<IndexAccess>,
    index: Arc<dyn BtreeIndex>,
    key_vals: Vec<KeyValRange>,
    /// `None` until the ranges are evaluated for the current block.
    curr_keyno: Option<usize>,
    bt_scan: BtreeScan,
    oids: Option<PooledOidList>,
    covered: Vec<CoveredRow>,
    covered_limit: usize,
    limits: KeyLimits,
    iss: IndexSkipScan,
    mro: MultiRangeOpt,
    key_cache: AttrCache,
    collation: Collation,
    oid_order: bool,
}

impl IndexScanDriver {
    pub fn open(
        env: &ScanEnv,
        access: Arc<IndexAccess>,
        index: Arc<dyn BtreeIndex>,
    ) -> ScanResult<Self> {
        let info = index.info();
        if access.key_info.ranges.is_empty() {
            return Err(ScanError::invalid_plan(format!(
                "index scan on {} has no key ranges",
                info.name
            )));
        }
        if let Some(cols) = &access.covering {
            if let Some(bad) = cols.iter().find(|c| **c >= info.num_attrs()) {
                return Err(ScanError::invalid_plan(format!(
                    "covering column {} is not a column of {}",
                    bad, info.name
                )));
            }
        }
        if access.key_info.use_iss && info.num_attrs() < 2 {
            return Err(ScanError::invalid_plan(format!(
                "index skip scan needs a composite index, {} has one column",
                info.name
            )));
        }

        let oids = if access.is_covering() {
            None
        } else {
            Some(env.oid_pool().checkout()?)
        };

        Ok(Self {
            bt_scan: BtreeScan::new(access.use_desc_index),
            iss: IndexSkipScan::new(access.key_info.use_iss),
            key_vals: Vec::with_capacity(access.key_info.ranges.len()),
            curr_keyno: None,
            oids,
            covered: Vec::new(),
            covered_limit: env.oid_pool().buffer_capacity().max(1),
            limits: KeyLimits::unlimited(),
            mro: MultiRangeOpt::disabled(),
            key_cache: AttrCache::default(),
            collation: env.config().collation(),
            oid_order: env.config().index_scan_in_oid_order,
            access,
            index,
        })
    }

    pub fn access(&self) -> &IndexAccess {
        &self.access
    }

    pub fn index(&self) -> &dyn BtreeIndex {
        self.index.as_ref()
    }

    pub fn limits(&self) -> KeyLimits {
        self.limits
    }

    pub fn skip_scan(&self) -> &IndexSkipScan {
        &self.iss
    }

    pub fn uses_mro(&self) -> bool {
        self.mro.is_enabled()
    }

    /// Evaluated ranges of the current block, in search order.
    pub fn key_vals(&self) -> &[KeyValRange] {
        &self.key_vals
    }

    pub fn is_end_of_scan(&self) -> bool {
        self.bt_scan.is_end_of_scan()
    }

    /// Evaluate key limits and choose the result mode for a new scan.
    pub fn start(
        &mut self,
        env: &ScanEnv,
        vd: &ValDescr,
        grouped: bool,
        stats: &mut ScanStats,
    ) -> ScanResult<()> {
        self.limits = KeyLimits::evaluate(&self.access.key_info, env.fetch(), vd)?;
        self.mro = self.plan_mro(env, grouped);

        stats.covered_index = self.access.is_covering();
        stats.multi_range_opt = self.mro.is_enabled();
        stats.index_skip_scan = self.iss.is_enabled();

        self.reset();
        Ok(())
    }

    fn plan_mro(&self, env: &ScanEnv, grouped: bool) -> MultiRangeOpt {
        let info = &self.access.key_info;
        let upper = match (self.limits.lower, self.limits.upper) {
            (None, Some(u)) if u > 0 => u as usize,
            _ => return MultiRangeOpt::disabled(),
        };
        let eligible = self.index.info().num_attrs() > 1
            && self.access.shape.is_key()
            && info.limit_reset
            && upper <= env.config().multi_range_opt_limit;
        if !eligible {
            return MultiRangeOpt::disabled();
        }

        let index_name = self.index.info().name.as_str();
        if self.access.mro_sort.is_empty() || grouped {
            let reason = if grouped { "grouped scan" } else { "no sort columns" };
            log_event(
                Event::MroDisabled,
                &[("index", index_name), ("reason", reason)],
            );
            return MultiRangeOpt::disabled();
        }

        let size = upper.to_string();
        log_event(Event::MroEnabled, &[("index", index_name), ("size", size.as_str())]);
        MultiRangeOpt::new(upper, self.access.mro_sort.clone(), self.collation)
    }

    /// Rewind to the first range without re-evaluating key limits.
    pub fn reset(&mut self) {
        self.curr_keyno = None;
        self.bt_scan.restart();
        self.iss.reset();
        self.clear_results();
    }

    /// Drop per-iteration results, keep buffers for the next block.
    pub fn end(&mut self) {
        self.curr_keyno = None;
        self.key_vals.clear();
        self.clear_results();
    }

    /// Return the OID buffer to the pool and free result storage.
    pub fn release(&mut self) {
        self.end();
        self.oids = None;
        self.covered = Vec::new();
    }

    fn clear_results(&mut self) {
        if let Some(list) = self.oids.as_deref_mut() {
            list.clear();
        }
        self.covered.clear();
        self.mro.clear();
    }

    /// Number of results in the current batch.
    pub fn result_count(&self) -> usize {
        if self.mro.is_enabled() {
            self.mro.len()
        } else if self.access.is_covering() {
            self.covered.len()
        } else {
            self.oids.as_ref().map_or(0, |list| list.len())
        }
    }

    pub fn result_at(&self, idx: usize) -> Option<IndexHit<'_>> {
        if self.mro.is_enabled() {
            return self.mro.get(idx).map(|it| IndexHit {
                oid: it.oid,
                key: Some(&it.key),
            });
        }
        if self.access.is_covering() {
            return self.covered.get(idx).map(|row| IndexHit {
                oid: row.oid,
                key: Some(&row.key),
            });
        }
        self.oids
            .as_ref()
            .and_then(|list| list.get(idx))
            .map(|oid| IndexHit { oid, key: None })
    }

    /// Evaluate the compiled ranges into search order.
    fn materialize(&mut self, env: &ScanEnv, vd: &ValDescr) -> ScanResult<()> {
        let prefix = self.index.info().prefix_length;
        let iss = self.iss.is_enabled().then_some(&self.iss);

        let mut vals = Vec::with_capacity(self.access.key_info.ranges.len());
        for range in &self.access.key_info.ranges {
            vals.push(eval_range(range, env.fetch(), vd, iss, prefix, self.collation)?);
        }
        canonicalize(&mut vals, self.access.shape, self.access.descending_skip, self.collation);

        self.key_vals = vals;
        self.curr_keyno = Some(0);
        Ok(())
    }

    fn reset_limit_for_next_key(&mut self, env: &ScanEnv, vd: &ValDescr) -> ScanResult<()> {
        self.limits.reset_for_next_key(&self.access.key_info, env.fetch(), vd)?;
        Ok(())
    }

    /// Fill the result buffer with the next batch.
    ///
    /// Stops when the buffer is full, or, for key and range lists, as soon
    /// as one entry produced results. With the multi-range optimization
    /// every entry runs to the end in one call.
    pub fn get_index_oidset(
        &mut self,
        env: &ScanEnv,
        values: &[DbValue],
        vd: &ValDescr,
        stats: &mut ScanStats,
    ) -> ScanResult<()> {
        if self.curr_keyno.is_none() {
            self.materialize(env, vd)?;
        }
        self.clear_results();

        let shape = self.access.shape;
        let key_cnt = self.key_vals.len();
        let mut keyno = self.curr_keyno.unwrap_or(0);

        match shape {
            RangeShape::Key | RangeShape::Range => {
                if key_cnt != 1 {
                    return Err(ScanError::invalid_plan(format!(
                        "{:?} access needs exactly one range, got {}",
                        shape, key_cnt
                    )));
                }
                if keyno >= key_cnt {
                    return Ok(());
                }
                let kv = &self.key_vals[0];
                if kv.is_na() {
                    self.curr_keyno = Some(1);
                    return Ok(());
                }
                if shape == RangeShape::Key && kv.kind != RangeKind::Eq {
                    return Err(ScanError::invalid_plan(format!(
                        "key access with a {} range",
                        kv.kind
                    )));
                }

                let search = search_range(kv);
                self.search(&search, values, vd, stats)?;
                if self.bt_scan.is_end_of_scan() {
                    self.curr_keyno = Some(1);
                }
            }
            RangeShape::KeyList | RangeShape::RangeList => {
                while keyno < key_cnt {
                    let kv = &self.key_vals[keyno];
                    if kv.is_na() {
                        keyno += 1;
                        self.curr_keyno = Some(keyno);
                        self.reset_limit_for_next_key(env, vd)?;
                        continue;
                    }
                    if shape == RangeShape::KeyList && kv.kind != RangeKind::Eq {
                        return Err(ScanError::invalid_plan(format!(
                            "key list entry with a {} range",
                            kv.kind
                        )));
                    }

                    let search = search_range(kv);
                    self.search(&search, values, vd, stats)?;

                    // Only a finished entry moves the key number; a full
                    // buffer resumes the same entry next time.
                    if self.bt_scan.is_end_of_scan() {
                        keyno += 1;
                        self.curr_keyno = Some(keyno);
                        self.reset_limit_for_next_key(env, vd)?;
                    }

                    if self.mro.is_enabled() {
                        continue;
                    }
                    if self.result_count() > 0 {
                        break;
                    }
                }
            }
        }

        if self.oid_order && !self.mro.is_enabled() {
            if let Some(list) = self.oids.as_deref_mut() {
                list.sort();
            }
        }
        Ok(())
    }

    fn search(
        &mut self,
        range: &KeyValRange,
        values: &[DbValue],
        vd: &ValDescr,
        stats: &mut ScanStats,
    ) -> ScanResult<usize> {
        let Self {
            access,
            index,
            bt_scan,
            oids,
            covered,
            covered_limit,
            limits,
            mro,
            key_cache,
            ..
        } = self;
        let info = index.info();

        let mut filter = KeyFilter {
            range: key_stage(&access.range_pred, &access.range_attrs, access.class_oid, info),
            key: key_stage(&access.key_pred, &access.key_attrs, access.class_oid, info),
            cache: key_cache,
            values,
            vd,
        };
        let filter = if filter.is_empty() { None } else { Some(&mut filter) };
        let limits = if limits.is_unlimited() { None } else { Some(limits) };

        let mut sink = if mro.is_enabled() {
            SearchSink::TopN(mro)
        } else if let Some(list) = oids.as_deref_mut() {
            SearchSink::Oids(list)
        } else {
            SearchSink::Covered {
                rows: covered,
                limit: *covered_limit,
            }
        };

        range_search(&**index, bt_scan, range, filter, limits, &mut sink, stats)
    }

    /// Get the next non-empty batch, moving the skip scan to its next
    /// leading value when asked to or when a value is exhausted.
    pub fn next_oidset(
        &mut self,
        env: &ScanEnv,
        values: &[DbValue],
        vd: &ValDescr,
        stats: &mut ScanStats,
        mut go_to_next_iss_value: bool,
    ) -> ScanResult<ScanCode> {
        loop {
            if self.iss.is_enabled() && go_to_next_iss_value {
                let code = self
                    .iss
                    .advance(self.index.as_ref(), self.access.use_desc_index, stats)?;
                if code == ScanCode::End {
                    return Ok(ScanCode::End);
                }
                self.curr_keyno = None;
                self.bt_scan.restart();
            }

            self.get_index_oidset(env, values, vd, stats)?;

            if self.result_count() == 0 {
                if self.iss.is_enabled() {
                    go_to_next_iss_value = true;
                    continue;
                }
                return Ok(ScanCode::End);
            }
            return Ok(ScanCode::Success);
        }
    }

    /// Whether a drained batch means the scan is over.
    pub fn batch_was_last(&self) -> bool {
        if self.mro.is_enabled() {
            return true;
        }
        self.bt_scan.is_end_of_scan() && !self.access.shape.is_list() && !self.iss.is_enabled()
    }

    /// A drained batch of a single key or range under skip scan moves on to
    /// the next leading value.
    pub fn should_advance_iss(&self) -> bool {
        self.bt_scan.is_end_of_scan() && !self.access.shape.is_list()
    }
}

fn key_stage<'a>(
    pred: &'a ScanPred,
    attrs: &'a ScanAttrs,
    class_oid: Oid,
    info: &'a IndexInfo,
) -> Option<FilterInfo<'a>> {
    if pred.is_none() {
        return None;
    }
    Some(FilterInfo::new(pred, attrs, class_oid).for_index(&info.attr_ids, &info.vstr_columns))
}

/// The range actually handed to the B-tree: equality and truncated bounds
/// search as `[key1, key2]`; infinite bounds carry no value.
fn search_range(kv: &KeyValRange) -> KeyValRange {
    let mut search = kv.clone();
    if search.kind == RangeKind::Eq || search.is_truncated {
        search.kind = RangeKind::GeLe;
    }
    if search.kind.has_infinite_lower() {
        search.key1 = DbValue::Null;
    }
    if search.kind.has_infinite_upper() {
        search.key2 = DbValue::Null;
    }
    search
}

fn eval_range(
    range: &KeyRange,
    fetch: &dyn ValueFetch,
    vd: &ValDescr,
    iss: Option<&IndexSkipScan>,
    prefix: Option<usize>,
    collation: Collation,
) -> ScanResult<KeyValRange> {
    use RangeKind::*;

    let terms = range
        .key1
        .as_ref()
        .or(range.key2.as_ref())
        .map_or(0, RegExpr::index_terms);

    let mut truncated = false;
    let mut eval = |expr: &RegExpr| -> ScanResult<DbValue> {
        let mut value = fetch.copy(expr, vd)?;
        if let Some(iss) = iss {
            iss.substitute(&mut value);
        }
        if let Some(len) = prefix {
            truncated |= truncate_prefix(&mut value, len);
        }
        Ok(value)
    };
    let key1 = range.key1.as_ref().map(&mut eval).transpose()?;
    let key2 = range.key2.as_ref().map(&mut eval).transpose()?;

    let missing = |which: &str| {
        ScanError::invalid_plan(format!("{} range without {}", range.kind, which))
    };
    let (key1, key2) = match range.kind {
        Eq => {
            let key = key1.ok_or_else(|| missing("a key"))?;
            (key.clone(), key)
        }
        GeLe | GeLt | GtLe | GtLt => (
            key1.ok_or_else(|| missing("a lower bound"))?,
            key2.ok_or_else(|| missing("an upper bound"))?,
        ),
        GeInf | GtInf => (key1.ok_or_else(|| missing("a lower bound"))?, DbValue::Null),
        InfLe | InfLt => (DbValue::Null, key2.ok_or_else(|| missing("an upper bound"))?),
        InfInf => return Ok(KeyValRange::unbounded()),
        Na => return Ok(KeyValRange::na()),
    };

    // NULL never matches an index key; such a range selects nothing.
    let empty = match range.kind {
        Eq | GeInf | GtInf => key1.has_null_component(),
        InfLe | InfLt => key2.has_null_component(),
        _ => {
            let columns = if terms == 0 { usize::MAX } else { terms };
            key1.has_null_component()
                || key2.has_null_component()
                || key1.compare_columns(&key2, columns, collation)
                    == Some(std::cmp::Ordering::Greater)
        }
    };
    if empty {
        return Ok(KeyValRange::na());
    }

    Ok(KeyValRange {
        kind: range.kind,
        key1,
        key2,
        is_truncated: truncated,
        num_index_term: terms,
    })
}
