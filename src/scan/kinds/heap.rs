//! Sequential heap scans
//!
//! An ungrouped scan walks every slot of every page, forward or backward.
//! A grouped scan treats each page as one block: `next_scan_block` moves
//! to the following page (the prior one when walking backward) and `next`
//! stays within it.

use crate::collab::{FetchMode, HeapGet, HeapStorage, PageId, ReevalFilters};
use crate::filter::{AttrCache, FilterInfo};
use crate::observability::ScanStats;
use crate::plan::{HeapAccess, HeapFileId};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::mvcc::{lock_and_reevaluate, Locked};
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::Oid;

use super::LeafScan;

/// Page and slot position of a heap walk.
#[derive(Debug, Default)]
struct HeapWalk {
    pages: Vec<PageId>,
    page: Option<usize>,
    slots: Vec<Oid>,
    slot: Option<usize>,
}

impl HeapWalk {
    fn load(&mut self, heap: &dyn HeapStorage, hfid: HeapFileId) -> ScanResult<()> {
        self.pages = heap.pages(hfid)?;
        self.rewind();
        Ok(())
    }

    fn rewind(&mut self) {
        self.page = None;
        self.slots.clear();
        self.slot = None;
    }

    fn rewind_page(&mut self) {
        self.slot = None;
    }

    /// Page following the current one in walk order.
    fn following_page(&self, forward: bool) -> Option<usize> {
        let next = match (self.page, forward) {
            (None, true) => 0,
            (Some(p), true) => p + 1,
            (None, false) => self.pages.len().checked_sub(1)?,
            (Some(p), false) => p.checked_sub(1)?,
        };
        (next < self.pages.len()).then_some(next)
    }

    fn enter(
        &mut self,
        heap: &dyn HeapStorage,
        hfid: HeapFileId,
        idx: usize,
        stats: &mut ScanStats,
    ) -> ScanResult<()> {
        self.slots = heap.slots(hfid, self.pages[idx])?;
        self.page = Some(idx);
        self.slot = None;
        stats.ioreads += 1;
        Ok(())
    }

    /// Next slot of the current page.
    fn step_in_page(&mut self, forward: bool) -> Option<Oid> {
        let next = if forward {
            self.slot.map_or(0, |s| s + 1)
        } else {
            match self.slot {
                None => self.slots.len().checked_sub(1)?,
                Some(s) => s.checked_sub(1)?,
            }
        };
        let oid = self.slots.get(next).copied()?;
        self.slot = Some(next);
        Some(oid)
    }

    /// Next slot of the file, crossing page boundaries.
    fn step(
        &mut self,
        heap: &dyn HeapStorage,
        hfid: HeapFileId,
        forward: bool,
        stats: &mut ScanStats,
    ) -> ScanResult<Option<Oid>> {
        loop {
            if self.page.is_some() {
                if let Some(oid) = self.step_in_page(forward) {
                    return Ok(Some(oid));
                }
            }
            let Some(page) = self.following_page(forward) else {
                return Ok(None);
            };
            self.enter(heap, hfid, page, stats)?;
        }
    }
}

pub(crate) struct HeapScan {
    access: HeapAccess,
    walk: HeapWalk,
    cache: AttrCache,
}

impl HeapScan {
    pub(crate) fn new(access: HeapAccess) -> Self {
        Self {
            access,
            walk: HeapWalk::default(),
            cache: AttrCache::default(),
        }
    }
}

impl LeafScan for HeapScan {
    fn start(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.walk.load(core.env.heap(), self.access.hfid)
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let forward = core.is_forward();
        let class_oid = self.access.class_oid;

        loop {
            let oid = if core.grouped {
                self.walk.step_in_page(forward)
            } else {
                self.walk
                    .step(core.env.heap(), self.access.hfid, forward, &mut core.stats)?
            };
            let Some(oid) = oid else {
                return Ok(ScanCode::End);
            };

            core.stats.read_rows += 1;
            core.stats.fetches += 1;
            let record = match core.env.heap().get_visible_version(oid, class_oid, FetchMode::Peek)? {
                HeapGet::Visible(record) => record,
                HeapGet::SnapshotNotSatisfied | HeapGet::DoesntExist => continue,
                HeapGet::Corrupt(reason) => {
                    return Err(ScanError::collaborator("heap", format!("{}: {}", oid, reason)));
                }
            };

            let data = FilterInfo::new(&self.access.pred, &self.access.pred_attrs, class_oid);
            let ev = data.eval_record(&mut self.cache, Some(oid), &record.attrs, &core.values, &core.vd)?;
            if !core.admit(ev) {
                continue;
            }

            let record = if core.op.locks_rows() {
                let filters = ReevalFilters::data_only(data);
                match lock_and_reevaluate(
                    &core.env,
                    record,
                    class_oid,
                    &filters,
                    &core.values,
                    &core.vd,
                    &mut core.stats,
                )? {
                    Locked::Row(record) => record,
                    Locked::Skip => continue,
                }
            } else {
                record
            };

            core.fill_from(&self.access.rest_attrs.attr_ids, &record.attrs);
            core.stats.qualified_rows += 1;
            return Ok(ScanCode::Success);
        }
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        if core.grouped {
            self.walk.rewind_page();
        } else {
            self.walk.rewind();
            core.position = if core.is_forward() {
                ScanPosition::Before
            } else {
                ScanPosition::After
            };
        }
        Ok(())
    }

    fn next_block(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let forward = core.is_forward();
        if core.grouped {
            let Some(page) = self.walk.following_page(forward) else {
                return Ok(ScanCode::End);
            };
            self.walk
                .enter(core.env.heap(), self.access.hfid, page, &mut core.stats)?;
            return Ok(ScanCode::Success);
        }

        let fresh = if forward {
            core.position == ScanPosition::Before
        } else {
            core.position == ScanPosition::After
        };
        Ok(if fresh { ScanCode::Success } else { ScanCode::End })
    }

    fn end(&mut self, core: &mut CursorCore) {
        // Flipped for the finished iteration; `start` resets it.
        core.direction = core.direction.reversed();
    }
}
