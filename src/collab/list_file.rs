//! Materialized intermediate results

use crate::value::DbValue;

/// Tuples written by an earlier plan step, read back by list scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFile {
    columns: usize,
    tuples: Vec<Vec<DbValue>>,
}

impl ListFile {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            tuples: Vec::new(),
        }
    }

    pub fn from_tuples(columns: usize, tuples: Vec<Vec<DbValue>>) -> Self {
        Self { columns, tuples }
    }

    pub fn push(&mut self, tuple: Vec<DbValue>) {
        self.tuples.push(tuple);
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&[DbValue]> {
        self.tuples.get(idx).map(Vec::as_slice)
    }
}
