//! Scan cursor
//!
//! A `ScanCursor` is opened for one leaf access of a plan and driven by the
//! join layer through `start`, `next`, the block operations and `end`.
//! State transitions:
//!
//! ```text
//! Opened --start--> Started --end--> Ended --start--> Started
//!    \                  \               \
//!     +------close------+-----close------+--> Closed
//! ```
//!
//! Once `next` has returned `End`, further calls return `End` again until
//! the cursor is restarted or moved to another block.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::collab::{BtreeIndex, ListFile, RowSource, ScanEnv};
use crate::filter::{AttrId, Logical, Qualification};
use crate::index::KeyLimits;
use crate::observability::{log_event, Event, ScanStats};
use crate::plan::{
    ClassAttrAccess, HeapAccess, HeapPageAccess, IndexAccess, IndexKeyInfoAccess,
    IndexNodeInfoAccess, JsonTableAccess, RegExpr, ScanPred, SetAccess, ValDescr, ValuesAccess,
};
use crate::value::{DbType, DbValue};

use super::errors::{ScanError, ScanResult};
use super::kinds::{
    ClassAttrScan, HeapPageScan, HeapScan, IndexKeyInfoScan, IndexNodeInfoScan, IndexScan,
    JsonTableScan, ListScan, MethodScan, ScanKind, SetScan, ShowScan, ValuesScan,
};
use super::state::{
    ScanCode, ScanDirection, ScanOp, ScanPos, ScanPosition, ScanStatus, ScanType, SingleFetch,
};

/// How the join layer drives a cursor.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Fixed-block scan driven through `next_scan_block`.
    pub grouped: bool,
    pub single_fetch: SingleFetch,
    /// Outer join value; a NULL value short-circuits single-fetch scans.
    pub join_value: Option<RegExpr>,
    pub op: ScanOp,
    pub qualification: Qualification,
    pub vd: ValDescr,
}

impl ScanOptions {
    pub fn grouped(mut self) -> Self {
        self.grouped = true;
        self
    }

    pub fn with_single_fetch(mut self, single_fetch: SingleFetch) -> Self {
        self.single_fetch = single_fetch;
        self
    }

    pub fn with_join_value(mut self, join_value: RegExpr) -> Self {
        self.join_value = Some(join_value);
        self
    }

    pub fn with_op(mut self, op: ScanOp) -> Self {
        self.op = op;
        self
    }

    pub fn with_vd(mut self, vd: ValDescr) -> Self {
        self.vd = vd;
        self
    }
}

/// Cursor state shared by every scan kind.
pub(crate) struct CursorCore {
    pub env: Arc<ScanEnv>,
    pub status: ScanStatus,
    pub position: ScanPosition,
    pub direction: ScanDirection,
    pub qualification: Qualification,
    pub single_fetch: SingleFetch,
    pub single_fetched: bool,
    pub null_fetched: bool,
    /// `next` already returned `End` for this block.
    pub exhausted: bool,
    pub join_value: Option<RegExpr>,
    pub grouped: bool,
    pub op: ScanOp,
    pub values: Vec<DbValue>,
    /// Declared row width; `None` when rows come from a collaborator.
    pub width: Option<usize>,
    pub vd: ValDescr,
    pub stats: ScanStats,
}

impl CursorCore {
    /// Replace the value list with one produced row.
    pub fn set_row(&mut self, row: Vec<DbValue>) -> ScanResult<()> {
        if let Some(width) = self.width {
            if row.len() != width {
                return Err(ScanError::invalid_plan(format!(
                    "row of {} values for a value list of {}",
                    row.len(),
                    width
                )));
            }
        }
        self.values = row;
        Ok(())
    }

    /// Copy record attributes `ids` into the value list, in order.
    pub fn fill_from(&mut self, ids: &[AttrId], record: &[DbValue]) {
        self.values.clear();
        self.values
            .extend(ids.iter().map(|id| record.get(*id).cloned().unwrap_or_default()));
    }

    pub fn set_null_row(&mut self) {
        let width = self.width.unwrap_or(self.values.len());
        self.values.clear();
        self.values.resize(width, DbValue::Null);
    }

    pub fn admit(&mut self, ev: Logical) -> bool {
        self.qualification.admit(ev)
    }

    pub fn is_forward(&self) -> bool {
        self.direction.is_forward()
    }
}

/// Which way a single-fetch step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Next,
    Prev,
}

pub struct ScanCursor {
    scan_id: Uuid,
    pub(crate) core: CursorCore,
    pub(crate) kind: ScanKind,
}

impl ScanCursor {
    fn open(
        env: Arc<ScanEnv>,
        kind: ScanKind,
        width: Option<usize>,
        index_scan: bool,
        options: ScanOptions,
    ) -> Self {
        let scan_id = Uuid::new_v4();
        let id = scan_id.to_string();
        let grouped = options.grouped.to_string();
        log_event(
            Event::ScanOpen,
            &[
                ("scan_id", id.as_str()),
                ("kind", kind.scan_type().as_str()),
                ("grouped", grouped.as_str()),
            ],
        );

        Self {
            scan_id,
            core: CursorCore {
                env,
                status: ScanStatus::Opened,
                position: ScanPosition::Before,
                direction: ScanDirection::Forward,
                qualification: options.qualification,
                single_fetch: options.single_fetch,
                single_fetched: false,
                null_fetched: false,
                exhausted: false,
                join_value: options.join_value,
                grouped: options.grouped,
                op: options.op,
                values: vec![DbValue::Null; width.unwrap_or(0)],
                width,
                vd: options.vd,
                stats: ScanStats::new(index_scan),
            },
            kind,
        }
    }

    pub fn open_heap(env: Arc<ScanEnv>, access: HeapAccess, options: ScanOptions) -> Self {
        let width = access.rest_attrs.len();
        Self::open(env, ScanKind::Heap(HeapScan::new(access)), Some(width), false, options)
    }

    pub fn open_heap_page(env: Arc<ScanEnv>, access: HeapPageAccess, options: ScanOptions) -> Self {
        Self::open(env, ScanKind::HeapPage(HeapPageScan::new(access)), None, false, options)
    }

    pub fn open_class_attr(
        env: Arc<ScanEnv>,
        access: ClassAttrAccess,
        options: ScanOptions,
    ) -> Self {
        let width = access.rest_attrs.len();
        let kind = ScanKind::ClassAttr(ClassAttrScan::new(access));
        Self::open(env, kind, Some(width), false, options)
    }

    /// Open an index scan. Non-covering scans check out an OID buffer from
    /// the pool; it returns to the pool when the cursor is closed.
    pub fn open_index(
        env: Arc<ScanEnv>,
        access: Arc<IndexAccess>,
        index: Arc<dyn BtreeIndex>,
        options: ScanOptions,
    ) -> ScanResult<Self> {
        let width = access.output_width();
        let scan = IndexScan::open(&env, access, index)?;
        Ok(Self::open(env, ScanKind::Index(scan), Some(width), true, options))
    }

    pub fn open_index_key_info(
        env: Arc<ScanEnv>,
        access: IndexKeyInfoAccess,
        index: Arc<dyn BtreeIndex>,
        options: ScanOptions,
    ) -> Self {
        let kind = ScanKind::IndexKeyInfo(IndexKeyInfoScan::new(access, index));
        Self::open(env, kind, None, false, options)
    }

    pub fn open_index_node_info(
        env: Arc<ScanEnv>,
        access: IndexNodeInfoAccess,
        index: Arc<dyn BtreeIndex>,
        options: ScanOptions,
    ) -> Self {
        let kind = ScanKind::IndexNodeInfo(IndexNodeInfoScan::new(access, index));
        Self::open(env, kind, None, false, options)
    }

    pub fn open_list(
        env: Arc<ScanEnv>,
        list: Arc<ListFile>,
        pred: ScanPred,
        options: ScanOptions,
    ) -> Self {
        let width = list.columns();
        Self::open(env, ScanKind::List(ListScan::new(list, pred)), Some(width), false, options)
    }

    pub fn open_show(
        env: Arc<ScanEnv>,
        source: Box<dyn RowSource>,
        columns: usize,
        pred: ScanPred,
        options: ScanOptions,
    ) -> Self {
        let kind = ScanKind::Show(ShowScan::new(source, pred));
        Self::open(env, kind, Some(columns), false, options)
    }

    pub fn open_values(
        env: Arc<ScanEnv>,
        access: ValuesAccess,
        options: ScanOptions,
    ) -> ScanResult<Self> {
        let scan = ValuesScan::new(access)?;
        let width = scan.width();
        Ok(Self::open(env, ScanKind::Values(scan), Some(width), false, options))
    }

    pub fn open_set(env: Arc<ScanEnv>, access: SetAccess, options: ScanOptions) -> Self {
        Self::open(env, ScanKind::Set(SetScan::new(access)), Some(1), false, options)
    }

    pub fn open_json_table(
        env: Arc<ScanEnv>,
        access: JsonTableAccess,
        options: ScanOptions,
    ) -> Self {
        let width = access.columns.len();
        let kind = ScanKind::JsonTable(JsonTableScan::new(access));
        Self::open(env, kind, Some(width), false, options)
    }

    /// Open a method scan. Every produced value must be NULL or of the
    /// declared result type of its column.
    pub fn open_method(
        env: Arc<ScanEnv>,
        source: Box<dyn RowSource>,
        result_types: Vec<DbType>,
        options: ScanOptions,
    ) -> Self {
        let width = result_types.len();
        let kind = ScanKind::Method(MethodScan::new(source, result_types));
        Self::open(env, kind, Some(width), false, options)
    }

    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.kind.scan_type()
    }

    pub fn status(&self) -> ScanStatus {
        self.core.status
    }

    pub fn position(&self) -> ScanPosition {
        self.core.position
    }

    pub fn direction(&self) -> ScanDirection {
        self.core.direction
    }

    /// Direction of the current iteration; `start` resets it to forward.
    pub fn set_direction(&mut self, direction: ScanDirection) {
        self.core.direction = direction;
    }

    pub fn qualification(&self) -> Qualification {
        self.core.qualification
    }

    pub fn set_qualification(&mut self, qualification: Qualification) {
        self.core.qualification = qualification;
    }

    pub fn set_single_fetch(&mut self, single_fetch: SingleFetch) {
        self.core.single_fetch = single_fetch;
    }

    pub fn set_join_value(&mut self, join_value: Option<RegExpr>) {
        self.core.join_value = join_value;
    }

    /// Host variables, rebound by correlated scans between blocks.
    pub fn vd_mut(&mut self) -> &mut ValDescr {
        &mut self.core.vd
    }

    /// Values of the current row.
    pub fn values(&self) -> &[DbValue] {
        &self.core.values
    }

    pub fn stats(&self) -> &ScanStats {
        &self.core.stats
    }

    /// Per-scan counters as JSON, tagged with the scan id and kind.
    pub fn stats_json(&self) -> Value {
        let mut value = self.core.stats.to_json();
        value["scan_id"] = Value::String(self.scan_id.to_string());
        value["kind"] = Value::String(self.scan_type().as_str().to_string());
        value
    }

    /// Key limits in force, for index scans.
    pub fn key_limits(&self) -> Option<KeyLimits> {
        match &self.kind {
            ScanKind::Index(scan) => Some(scan.driver().limits()),
            _ => None,
        }
    }

    /// Whether the top-N multi-range optimization is in use.
    pub fn uses_multi_range_opt(&self) -> bool {
        match &self.kind {
            ScanKind::Index(scan) => scan.driver().uses_mro(),
            _ => false,
        }
    }

    fn check_interrupt(&self) -> ScanResult<()> {
        if self.core.env.stop_requested() {
            return Err(ScanError::interrupted());
        }
        Ok(())
    }

    fn expect_started(&self, operation: &str) -> ScanResult<()> {
        if self.core.status != ScanStatus::Started {
            return Err(ScanError::invalid_plan(format!(
                "{} on a {} scan",
                operation, self.core.status
            )));
        }
        Ok(())
    }

    pub fn start(&mut self) -> ScanResult<()> {
        match self.core.status {
            ScanStatus::Opened | ScanStatus::Ended => {}
            status => {
                return Err(ScanError::invalid_plan(format!("start on a {} scan", status)));
            }
        }

        let core = &mut self.core;
        core.position = ScanPosition::Before;
        // Every iteration starts forward; `end` may have flipped it.
        core.direction = ScanDirection::Forward;
        core.single_fetched = false;
        core.null_fetched = false;
        core.exhausted = false;
        core.stats.resume();

        self.kind.leaf().start(&mut self.core)?;
        self.core.status = ScanStatus::Started;
        Ok(())
    }

    /// Move to the next qualified row.
    pub fn next(&mut self) -> ScanResult<ScanCode> {
        self.check_interrupt()?;
        match self.core.status {
            ScanStatus::Started => {}
            ScanStatus::Ended => return Ok(ScanCode::End),
            status => {
                return Err(ScanError::invalid_plan(format!("next on a {} scan", status)));
            }
        }
        if self.core.exhausted {
            return Ok(ScanCode::End);
        }

        let code = self.handle_single_scan(Step::Next)?;
        match code {
            ScanCode::Success => self.core.position = ScanPosition::On,
            ScanCode::End => {
                self.core.exhausted = true;
                self.core.position = if self.core.is_forward() {
                    ScanPosition::After
                } else {
                    ScanPosition::Before
                };
            }
        }
        Ok(code)
    }

    /// Move to the previous qualified row. List scans only.
    pub fn prev(&mut self) -> ScanResult<ScanCode> {
        self.check_interrupt()?;
        if !matches!(self.kind, ScanKind::List(_)) {
            return Err(ScanError::unsupported("prev", self.scan_type().as_str()));
        }
        self.expect_started("prev")?;

        let code = self.handle_single_scan(Step::Prev)?;
        match code {
            ScanCode::Success => {
                self.core.position = ScanPosition::On;
                self.core.exhausted = false;
            }
            ScanCode::End => self.core.position = ScanPosition::Before,
        }
        Ok(code)
    }

    pub(crate) fn step_local(&mut self, step: Step) -> ScanResult<ScanCode> {
        let kind_name = self.scan_type().as_str();
        match (step, &mut self.kind) {
            (Step::Next, kind) => kind.leaf().next(&mut self.core),
            (Step::Prev, ScanKind::List(list)) => list.prev(&mut self.core),
            (Step::Prev, _) => Err(ScanError::unsupported("prev", kind_name)),
        }
    }

    /// Rewind the current block so it can be read again.
    pub fn reset_scan_block(&mut self) -> ScanResult<()> {
        self.expect_started("reset_scan_block")?;
        let core = &mut self.core;
        core.single_fetched = false;
        core.null_fetched = false;
        core.exhausted = false;
        self.kind.leaf().reset_block(&mut self.core)
    }

    /// Move to the next block of a grouped scan. Ungrouped scans have one
    /// block, available while the cursor has not moved yet.
    pub fn next_scan_block(&mut self) -> ScanResult<ScanCode> {
        self.check_interrupt()?;
        self.expect_started("next_scan_block")?;
        let core = &mut self.core;
        core.single_fetched = false;
        core.null_fetched = false;
        core.exhausted = false;
        self.kind.leaf().next_block(&mut self.core)
    }

    /// Finish the current iteration; the cursor may be started again.
    pub fn end(&mut self) {
        if matches!(self.core.status, ScanStatus::Ended | ScanStatus::Closed) {
            return;
        }
        self.kind.leaf().end(&mut self.core);
        self.core.stats.pause();
        self.core.status = ScanStatus::Ended;
    }

    /// Release everything the cursor holds.
    pub fn close(&mut self) {
        if self.core.status == ScanStatus::Closed {
            return;
        }
        if self.core.status == ScanStatus::Started {
            self.end();
        }
        self.kind.leaf().close();
        self.core.status = ScanStatus::Closed;

        let id = self.scan_id.to_string();
        let stats = self.core.stats.to_string();
        log_event(
            Event::ScanClose,
            &[
                ("scan_id", id.as_str()),
                ("kind", self.scan_type().as_str()),
                ("stats", stats.as_str()),
            ],
        );
    }

    /// Snapshot the position of a list scan.
    pub fn save_scan_pos(&self) -> ScanResult<ScanPos> {
        match &self.kind {
            ScanKind::List(list) => Ok(ScanPos {
                status: self.core.status,
                position: self.core.position,
                tuple: list.current(),
            }),
            _ => Err(ScanError::unsupported("save_scan_pos", self.scan_type().as_str())),
        }
    }

    /// Return to a saved position and continue forward from it. The saved
    /// row is produced again.
    pub fn jump_scan_pos(&mut self, pos: &ScanPos) -> ScanResult<ScanCode> {
        self.check_interrupt()?;
        let kind_name = self.scan_type().as_str();
        let ScanKind::List(list) = &mut self.kind else {
            return Err(ScanError::unsupported("jump_scan_pos", kind_name));
        };

        self.core.status = pos.status;
        self.core.position = pos.position;
        self.core.exhausted = false;

        let code = list.jump(&mut self.core, pos.tuple)?;
        match code {
            ScanCode::Success => self.core.position = ScanPosition::On,
            ScanCode::End => {
                self.core.position = ScanPosition::After;
                self.core.exhausted = true;
            }
        }
        Ok(code)
    }
}

impl Drop for ScanCursor {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ScanCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCursor")
            .field("scan_id", &self.scan_id)
            .field("kind", &self.scan_type())
            .field("status", &self.core.status)
            .field("position", &self.core.position)
            .field("direction", &self.core.direction)
            .finish()
    }
}
