//! Set scans: one row per element of a set value

use crate::filter::FilterInfo;
use crate::plan::{ScanAttrs, SetAccess};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::{DbValue, Oid};

use super::{LeafScan, RowWalk};

pub(crate) struct SetScan {
    access: SetAccess,
    elements: Vec<DbValue>,
    walk: RowWalk,
}

impl SetScan {
    pub(crate) fn new(access: SetAccess) -> Self {
        Self {
            access,
            elements: Vec::new(),
            walk: RowWalk::default(),
        }
    }

    fn load(&mut self, core: &CursorCore) -> ScanResult<()> {
        self.walk.reset();
        self.elements = match core.env.fetch().copy(&self.access.set, &core.vd)? {
            DbValue::Set(elements) => elements,
            DbValue::Null => Vec::new(),
            other => {
                return Err(ScanError::invalid_datatype(format!(
                    "set scan over a {} value",
                    other.db_type()
                )));
            }
        };
        Ok(())
    }
}

impl LeafScan for SetScan {
    fn start(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.load(core)
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let no_attrs = ScanAttrs::default();
        let filter = FilterInfo::new(&self.access.pred, &no_attrs, Oid::NULL);

        let mut position = core.position;
        while let Some(idx) = self.walk.advance(position, self.elements.len()) {
            position = ScanPosition::On;
            core.stats.read_rows += 1;
            core.set_row(vec![self.elements[idx].clone()])?;

            let ev = filter.eval_values(&core.values, &core.vd)?;
            if core.admit(ev) {
                core.stats.qualified_rows += 1;
                return Ok(ScanCode::Success);
            }
        }
        Ok(ScanCode::End)
    }

    /// Correlated set expressions are evaluated again for each block.
    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.load(core)?;
        core.position = ScanPosition::Before;
        Ok(())
    }
}
