//! MVCC reevaluation seam

use crate::filter::{AttrCache, FilterInfo};
use crate::plan::ValDescr;
use crate::scan::ScanResult;
use crate::value::DbValue;

use super::heap::HeapRecord;

/// Filters that qualified the snapshot version of a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReevalFilters<'a> {
    pub range: Option<FilterInfo<'a>>,
    pub key: Option<FilterInfo<'a>>,
    pub data: Option<FilterInfo<'a>>,
}

impl<'a> ReevalFilters<'a> {
    pub fn data_only(data: FilterInfo<'a>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterInfo<'a>> {
        [&self.range, &self.key, &self.data]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

/// Re-checks a locked version that differs from the one filtered.
pub trait MvccReevaluator: Send + Sync {
    /// `Ok(false)` means the locked version no longer qualifies.
    fn reevaluate(
        &self,
        filters: &ReevalFilters<'_>,
        locked: &HeapRecord,
        values: &[DbValue],
        vd: &ValDescr,
    ) -> ScanResult<bool>;
}

/// Runs every filter against the locked record's attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterReevaluator;

impl MvccReevaluator for FilterReevaluator {
    fn reevaluate(
        &self,
        filters: &ReevalFilters<'_>,
        locked: &HeapRecord,
        values: &[DbValue],
        vd: &ValDescr,
    ) -> ScanResult<bool> {
        let mut cache = AttrCache::default();
        for filter in filters.iter() {
            let ev = filter.eval_record(&mut cache, Some(locked.oid), &locked.attrs, values, vd)?;
            if !ev.is_true() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
