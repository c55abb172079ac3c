//! Values scans: rows of expressions evaluated per execution

use crate::plan::ValuesAccess;
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::state::{ScanCode, ScanPosition};

use super::{LeafScan, RowWalk};

pub(crate) struct ValuesScan {
    access: ValuesAccess,
    width: usize,
    walk: RowWalk,
}

impl ValuesScan {
    /// Every row must have the width of the first.
    pub(crate) fn new(access: ValuesAccess) -> ScanResult<Self> {
        let width = access.rows.first().map_or(0, Vec::len);
        if let Some(bad) = access.rows.iter().position(|row| row.len() != width) {
            return Err(ScanError::invalid_plan(format!(
                "values row {} has {} expressions, expected {}",
                bad,
                access.rows[bad].len(),
                width
            )));
        }
        Ok(Self {
            access,
            width,
            walk: RowWalk::default(),
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }
}

impl LeafScan for ValuesScan {
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let Some(idx) = self.walk.advance(core.position, self.access.rows.len()) else {
            return Ok(ScanCode::End);
        };

        let fetch = core.env.fetch();
        let row = self.access.rows[idx]
            .iter()
            .map(|expr| fetch.copy(expr, &core.vd))
            .collect::<ScanResult<Vec<_>>>()?;
        core.set_row(row)?;
        core.stats.read_rows += 1;
        core.stats.qualified_rows += 1;
        Ok(ScanCode::Success)
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.walk.reset();
        core.position = ScanPosition::Before;
        Ok(())
    }
}
