//! Scans over rows produced by a collaborator: show statements and method
//! calls

use crate::collab::RowSource;
use crate::filter::FilterInfo;
use crate::plan::{ScanAttrs, ScanPred};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::{DbType, DbValue, Oid};

use super::LeafScan;

/// Restart the source when the cursor is back before the first row.
fn rewind(source: &mut dyn RowSource, core: &CursorCore, opened: &mut bool) -> ScanResult<()> {
    if core.position == ScanPosition::Before || !*opened {
        source.open()?;
        *opened = true;
    }
    Ok(())
}

pub(crate) struct ShowScan {
    source: Box<dyn RowSource>,
    pred: ScanPred,
    opened: bool,
}

impl ShowScan {
    pub(crate) fn new(source: Box<dyn RowSource>, pred: ScanPred) -> Self {
        Self {
            source,
            pred,
            opened: false,
        }
    }
}

impl LeafScan for ShowScan {
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        if core.position == ScanPosition::After {
            return Ok(ScanCode::End);
        }
        rewind(self.source.as_mut(), core, &mut self.opened)?;

        let no_attrs = ScanAttrs::default();
        let filter = FilterInfo::new(&self.pred, &no_attrs, Oid::NULL);
        while let Some(row) = self.source.next_row()? {
            core.stats.read_rows += 1;
            core.set_row(row)?;
            let ev = filter.eval_values(&core.values, &core.vd)?;
            if core.admit(ev) {
                core.stats.qualified_rows += 1;
                return Ok(ScanCode::Success);
            }
        }
        Ok(ScanCode::End)
    }

    fn end(&mut self, _core: &mut CursorCore) {
        self.close();
    }

    fn close(&mut self) {
        if self.opened {
            self.source.close();
            self.opened = false;
        }
    }
}

pub(crate) struct MethodScan {
    source: Box<dyn RowSource>,
    result_types: Vec<DbType>,
    opened: bool,
}

impl MethodScan {
    pub(crate) fn new(source: Box<dyn RowSource>, result_types: Vec<DbType>) -> Self {
        Self {
            source,
            result_types,
            opened: false,
        }
    }

    fn check_types(&self, row: &[DbValue]) -> ScanResult<()> {
        for (col, (value, expected)) in row.iter().zip(&self.result_types).enumerate() {
            if !value.is_null() && value.db_type() != *expected {
                return Err(ScanError::invalid_datatype(format!(
                    "method result column {} is {}, expected {}",
                    col,
                    value.db_type(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

impl LeafScan for MethodScan {
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        if core.position == ScanPosition::After {
            return Ok(ScanCode::End);
        }
        rewind(self.source.as_mut(), core, &mut self.opened)?;

        let Some(row) = self.source.next_row()? else {
            return Ok(ScanCode::End);
        };
        core.stats.read_rows += 1;
        core.set_row(row)?;
        self.check_types(&core.values)?;
        core.stats.qualified_rows += 1;
        Ok(ScanCode::Success)
    }

    fn end(&mut self, _core: &mut CursorCore) {
        self.close();
    }

    fn close(&mut self) {
        if self.opened {
            self.source.close();
            self.opened = false;
        }
    }
}
