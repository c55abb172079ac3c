//! List file scans
//!
//! The only kind that moves backward and can save and restore its
//! position, for merge joins over sorted intermediate results.

use std::sync::Arc;

use crate::collab::ListFile;
use crate::filter::{FilterInfo, Qualification};
use crate::plan::{ScanAttrs, ScanPred};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::ScanResult;
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::Oid;

use super::LeafScan;

pub(crate) struct ListScan {
    list: Arc<ListFile>,
    pred: ScanPred,
    no_attrs: ScanAttrs,
    tuple: Option<usize>,
}

impl ListScan {
    pub(crate) fn new(list: Arc<ListFile>, pred: ScanPred) -> Self {
        Self {
            list,
            pred,
            no_attrs: ScanAttrs::default(),
            tuple: None,
        }
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.tuple
    }

    /// Load tuple `idx` into the value list and run the predicate.
    fn visit(&mut self, core: &mut CursorCore, idx: usize) -> ScanResult<Option<bool>> {
        let Some(tuple) = self.list.get(idx) else {
            return Ok(None);
        };
        self.tuple = Some(idx);
        core.stats.read_rows += 1;
        core.set_row(tuple.to_vec())?;

        let ev = FilterInfo::new(&self.pred, &self.no_attrs, Oid::NULL)
            .eval_values(&core.values, &core.vd)?;
        let admitted = core.admit(ev);
        if admitted {
            core.stats.qualified_rows += 1;
        }
        Ok(Some(admitted))
    }

    fn scan_forward(&mut self, core: &mut CursorCore, mut idx: usize) -> ScanResult<ScanCode> {
        while let Some(admitted) = self.visit(core, idx)? {
            if admitted {
                return Ok(ScanCode::Success);
            }
            idx += 1;
        }
        self.tuple = Some(self.list.len());
        Ok(ScanCode::End)
    }

    pub(crate) fn prev(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let mut idx = match core.position {
            ScanPosition::Before => return Ok(ScanCode::End),
            ScanPosition::On => self.tuple.unwrap_or(0),
            ScanPosition::After => self.list.len(),
        };
        while idx > 0 {
            idx -= 1;
            if self.visit(core, idx)? == Some(true) {
                return Ok(ScanCode::Success);
            }
        }
        self.tuple = None;
        Ok(ScanCode::End)
    }

    /// Produce the saved tuple again, then continue forward from it.
    pub(crate) fn jump(&mut self, core: &mut CursorCore, tuple: Option<usize>) -> ScanResult<ScanCode> {
        let Some(idx) = tuple.filter(|t| *t < self.list.len()) else {
            self.tuple = Some(self.list.len());
            return Ok(ScanCode::End);
        };

        // The saved tuple qualified when it was saved; only a scan for
        // non-qualifying rows checks it again.
        if core.qualification == Qualification::NotQualified {
            if self.visit(core, idx)? == Some(true) {
                return Ok(ScanCode::Success);
            }
            return self.scan_forward(core, idx + 1);
        }

        let Some(row) = self.list.get(idx) else {
            return Ok(ScanCode::End);
        };
        self.tuple = Some(idx);
        core.set_row(row.to_vec())?;
        Ok(ScanCode::Success)
    }
}

impl LeafScan for ListScan {
    fn start(&mut self, _core: &mut CursorCore) -> ScanResult<()> {
        self.tuple = None;
        Ok(())
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let idx = match core.position {
            ScanPosition::Before => 0,
            ScanPosition::On => self.tuple.map_or(0, |t| t + 1),
            ScanPosition::After => return Ok(ScanCode::End),
        };
        self.scan_forward(core, idx)
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.tuple = None;
        core.position = ScanPosition::Before;
        Ok(())
    }
}
