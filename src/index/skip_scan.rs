//! Index skip scan
//!
//! A composite index whose leading column is not constrained is read once
//! per distinct leading value. Each value is found with a one-column probe
//! of the index, then substituted into every range before the real search.

use std::fmt;

use crate::collab::BtreeIndex;
use crate::observability::{log_event, Event, ScanStats};
use crate::range::{KeyValRange, RangeKind};
use crate::scan::{ScanCode, ScanResult};
use crate::value::DbValue;

use super::search::{range_search, BtreeScan, SearchSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssOp {
    NotStarted,
    FetchingFirstKey,
    SearchingNextDistinctKey,
    RangeSearching,
}

impl fmt::Display for IssOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssOp::NotStarted => "not started",
            IssOp::FetchingFirstKey => "fetching first key",
            IssOp::SearchingNextDistinctKey => "searching next distinct key",
            IssOp::RangeSearching => "range searching",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct IndexSkipScan {
    enabled: bool,
    op: IssOp,
    value: Option<DbValue>,
}

impl IndexSkipScan {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            op: IssOp::NotStarted,
            value: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn op(&self) -> IssOp {
        self.op
    }

    /// Leading value the range search currently runs for.
    pub fn current_value(&self) -> Option<&DbValue> {
        self.value.as_ref()
    }

    pub fn reset(&mut self) {
        self.op = IssOp::NotStarted;
        self.value = None;
    }

    /// Probe range for the next leading value.
    ///
    /// The probe goes forward in traversal order from the previous value:
    /// above it for an ascending leading column, below it when either the
    /// column is descending or the scan walks the index backwards.
    fn probe_range(&self, index: &dyn BtreeIndex, use_desc_index: bool) -> KeyValRange {
        let Some(prev) = self.value.clone() else {
            return KeyValRange::unbounded().with_terms(1);
        };

        let bound = DbValue::Midxkey(vec![prev]);
        let descending = use_desc_index != index.info().leading_desc();
        let range = if descending {
            KeyValRange::new(RangeKind::InfLt, DbValue::Null, bound)
        } else {
            KeyValRange::new(RangeKind::GtInf, bound, DbValue::Null)
        };
        range.with_terms(1)
    }

    /// Find the next distinct leading value. `End` means there is none and
    /// the whole scan is over.
    pub fn advance(
        &mut self,
        index: &dyn BtreeIndex,
        use_desc_index: bool,
        stats: &mut ScanStats,
    ) -> ScanResult<ScanCode> {
        let range = self.probe_range(index, use_desc_index);
        self.op = if self.op == IssOp::NotStarted {
            IssOp::FetchingFirstKey
        } else {
            IssOp::SearchingNextDistinctKey
        };

        let mut first = None;
        let mut probe = BtreeScan::new(use_desc_index);
        range_search(
            index,
            &mut probe,
            &range,
            None,
            None,
            &mut SearchSink::FirstKey(&mut first),
            stats,
        )?;

        let Some(value) = first.as_ref().and_then(|key| key.column(0)).cloned() else {
            self.value = None;
            return Ok(ScanCode::End);
        };

        let field = value.to_string();
        log_event(Event::IssNextValue, &[("value", field.as_str())]);
        self.value = Some(value);
        self.op = IssOp::RangeSearching;
        Ok(ScanCode::Success)
    }

    /// Put the current leading value into column 0 of a composite bound.
    pub fn substitute(&self, bound: &mut DbValue) {
        let (Some(value), DbValue::Midxkey(cols)) = (&self.value, bound) else {
            return;
        };
        if let Some(first) = cols.first_mut() {
            *first = value.clone();
        }
    }
}
