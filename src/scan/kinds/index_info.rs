//! Index statistics scans
//!
//! Key info returns one row describing a single key; node info returns one
//! row per index node. Row layouts are defined by the B-tree.

use std::sync::Arc;

use crate::collab::BtreeIndex;
use crate::filter::FilterInfo;
use crate::plan::{IndexKeyInfoAccess, IndexNodeInfoAccess, ScanAttrs};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::ScanResult;
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::{DbValue, Oid};

use super::{LeafScan, RowWalk};

pub(crate) struct IndexKeyInfoScan {
    access: IndexKeyInfoAccess,
    index: Arc<dyn BtreeIndex>,
}

impl IndexKeyInfoScan {
    pub(crate) fn new(access: IndexKeyInfoAccess, index: Arc<dyn BtreeIndex>) -> Self {
        Self { access, index }
    }
}

impl LeafScan for IndexKeyInfoScan {
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        if core.position != ScanPosition::Before {
            return Ok(ScanCode::End);
        }
        core.position = ScanPosition::On;

        let key = core.env.fetch().copy(&self.access.key, &core.vd)?;
        core.stats.fetches += 1;
        let Some(row) = self.index.key_info(&key)? else {
            return Ok(ScanCode::End);
        };
        core.stats.read_keys += 1;
        core.stats.read_rows += 1;
        core.set_row(row)?;

        let no_attrs = ScanAttrs::default();
        let ev = FilterInfo::new(&self.access.pred, &no_attrs, Oid::NULL)
            .eval_values(&core.values, &core.vd)?;
        if !core.admit(ev) {
            return Ok(ScanCode::End);
        }
        core.stats.qualified_rows += 1;
        Ok(ScanCode::Success)
    }
}

pub(crate) struct IndexNodeInfoScan {
    access: IndexNodeInfoAccess,
    index: Arc<dyn BtreeIndex>,
    nodes: Vec<Vec<DbValue>>,
    walk: RowWalk,
}

impl IndexNodeInfoScan {
    pub(crate) fn new(access: IndexNodeInfoAccess, index: Arc<dyn BtreeIndex>) -> Self {
        Self {
            access,
            index,
            nodes: Vec::new(),
            walk: RowWalk::default(),
        }
    }
}

impl LeafScan for IndexNodeInfoScan {
    fn start(&mut self, _core: &mut CursorCore) -> ScanResult<()> {
        self.nodes = self.index.node_info()?;
        self.walk.reset();
        Ok(())
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let no_attrs = ScanAttrs::default();
        let filter = FilterInfo::new(&self.access.pred, &no_attrs, Oid::NULL);

        let mut position = core.position;
        while let Some(idx) = self.walk.advance(position, self.nodes.len()) {
            position = ScanPosition::On;
            core.stats.read_rows += 1;
            core.set_row(self.nodes[idx].clone())?;

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

    fn end(&mut self, _core: &mut CursorCore) {
        self.nodes.clear();
    }
}
