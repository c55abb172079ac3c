//! Row producers for show-statement and method scans

use crate::scan::ScanResult;
use crate::value::DbValue;

/// Produces rows one at a time.
pub trait RowSource: Send {
    fn open(&mut self) -> ScanResult<()> {
        Ok(())
    }

    /// Next row, `None` once exhausted.
    fn next_row(&mut self) -> ScanResult<Option<Vec<DbValue>>>;

    fn close(&mut self) {}
}

/// Rows computed up front.
#[derive(Debug, Clone, Default)]
pub struct VecRowSource {
    rows: Vec<Vec<DbValue>>,
    pos: usize,
}

impl VecRowSource {
    pub fn new(rows: Vec<Vec<DbValue>>) -> Self {
        Self { rows, pos: 0 }
    }
}

impl RowSource for VecRowSource {
    fn open(&mut self) -> ScanResult<()> {
        self.pos = 0;
        Ok(())
    }

    fn next_row(&mut self) -> ScanResult<Option<Vec<DbValue>>> {
        let row = self.rows.get(self.pos).cloned();
        if row.is_some() {
            self.pos += 1;
        }
        Ok(row)
    }
}
