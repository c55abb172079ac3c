//! Heap page header scans: one row per page of a heap file

use crate::collab::PageId;
use crate::filter::FilterInfo;
use crate::plan::{HeapPageAccess, ScanAttrs};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::ScanResult;
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::Oid;

use super::{LeafScan, RowWalk};

pub(crate) struct HeapPageScan {
    access: HeapPageAccess,
    pages: Vec<PageId>,
    walk: RowWalk,
}

impl HeapPageScan {
    pub(crate) fn new(access: HeapPageAccess) -> Self {
        Self {
            access,
            pages: Vec::new(),
            walk: RowWalk::default(),
        }
    }
}

impl LeafScan for HeapPageScan {
    fn start(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.pages = core.env.heap().pages(self.access.hfid)?;
        self.walk.reset();
        Ok(())
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let no_attrs = ScanAttrs::default();
        let filter = FilterInfo::new(&self.access.pred, &no_attrs, Oid::NULL);

        let mut position = core.position;
        while let Some(idx) = self.walk.advance(position, self.pages.len()) {
            position = ScanPosition::On;

            let header = core.env.heap().page_header(self.access.hfid, self.pages[idx])?;
            core.stats.ioreads += 1;
            core.stats.read_rows += 1;
            core.set_row(header)?;

            let ev = filter.eval_values(&core.values, &core.vd)?;
            if core.admit(ev) {
                core.stats.qualified_rows += 1;
                return Ok(ScanCode::Success);
            }
        }
        Ok(ScanCode::End)
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.walk.reset();
        core.position = ScanPosition::Before;
        Ok(())
    }
}
