//! JSON table scans
//!
//! The document is evaluated when the scan starts. The row path selects an
//! array (one row per element) or a single object (one row); each column
//! path is then walked from the row. A step names an object member or, on
//! an array, a zero-based position.

use serde_json::Value;

use crate::filter::FilterInfo;
use crate::plan::{JsonColumn, JsonTableAccess, ScanAttrs};
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::state::{ScanCode, ScanPosition};
use crate::value::{DbValue, Oid};

use super::{LeafScan, RowWalk};

fn walk<'a>(mut value: &'a Value, path: &[String]) -> Option<&'a Value> {
    for step in path {
        value = match value {
            Value::Object(members) => members.get(step)?,
            Value::Array(items) => items.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn to_db_value(value: &Value) -> DbValue {
    match value {
        Value::Null => DbValue::Null,
        Value::Bool(b) => DbValue::Integer(i32::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DbValue::BigInt(i),
            None => n.as_f64().map_or(DbValue::Null, DbValue::Double),
        },
        Value::String(s) => DbValue::String(s.clone()),
        other => DbValue::Json(other.clone()),
    }
}

fn column_value(column: &JsonColumn, row: &Value, ordinal: usize) -> DbValue {
    if column.ordinality {
        return DbValue::BigInt(ordinal as i64);
    }
    walk(row, &column.path).map_or(DbValue::Null, to_db_value)
}

pub(crate) struct JsonTableScan {
    access: JsonTableAccess,
    rows: Vec<Value>,
    walk: RowWalk,
}

impl JsonTableScan {
    pub(crate) fn new(access: JsonTableAccess) -> Self {
        Self {
            access,
            rows: Vec::new(),
            walk: RowWalk::default(),
        }
    }

    fn load(&mut self, core: &CursorCore) -> ScanResult<()> {
        self.walk.reset();
        let document = match core.env.fetch().copy(&self.access.document, &core.vd)? {
            DbValue::Json(value) => value,
            DbValue::String(text) => serde_json::from_str(&text)
                .map_err(|e| ScanError::cant_coerce(format!("json table document: {}", e)))?,
            DbValue::Null => Value::Null,
            other => {
                return Err(ScanError::invalid_datatype(format!(
                    "json table over a {} value",
                    other.db_type()
                )));
            }
        };

        self.rows = match walk(&document, &self.access.row_path) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(row) => vec![row.clone()],
        };
        Ok(())
    }
}

impl LeafScan for JsonTableScan {
    fn start(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.load(core)
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        let no_attrs = ScanAttrs::default();
        let filter = FilterInfo::new(&self.access.pred, &no_attrs, Oid::NULL);

        let mut position = core.position;
        while let Some(idx) = self.walk.advance(position, self.rows.len()) {
            position = ScanPosition::On;
            let row = &self.rows[idx];
            let values = self
                .access
                .columns
                .iter()
                .map(|column| column_value(column, row, idx + 1))
                .collect();
            core.stats.read_rows += 1;
            core.set_row(values)?;

            let ev = filter.eval_values(&core.values, &core.vd)?;
            if core.admit(ev) {
                core.stats.qualified_rows += 1;
                return Ok(ScanCode::Success);
            }
        }
        Ok(ScanCode::End)
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.load(core)?;
        core.position = ScanPosition::Before;
        Ok(())
    }
}
