//! Compiled value expressions and how they are fetched

use std::borrow::Cow;

use crate::scan::{ScanError, ScanResult};
use crate::value::DbValue;

/// A compiled value expression, as handed over by the plan compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum RegExpr {
    Constant(DbValue),
    /// Host variable slot in the value descriptor.
    HostVar(usize),
    /// Composite index key, one operand per leading index column.
    Midxkey(Vec<RegExpr>),
    /// Literal sequence `{a, b, c}`; evaluates to a set.
    Sequence(Vec<RegExpr>),
}

impl RegExpr {
    pub fn constant(value: impl Into<DbValue>) -> Self {
        RegExpr::Constant(value.into())
    }

    /// Operand count of a composite key, 0 for scalar expressions.
    pub fn index_terms(&self) -> usize {
        match self {
            RegExpr::Midxkey(ops) => ops.len(),
            _ => 0,
        }
    }
}

/// Host variable values for one statement execution.
///
/// Correlated scans rebind host variables between scan blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValDescr {
    host_vars: Vec<DbValue>,
}

impl ValDescr {
    pub fn new(host_vars: Vec<DbValue>) -> Self {
        Self { host_vars }
    }

    pub fn get(&self, slot: usize) -> Option<&DbValue> {
        self.host_vars.get(slot)
    }

    /// Bind `value` to `slot`, growing the descriptor with NULLs if needed.
    pub fn set(&mut self, slot: usize, value: DbValue) {
        if slot >= self.host_vars.len() {
            self.host_vars.resize(slot + 1, DbValue::Null);
        }
        self.host_vars[slot] = value;
    }

    pub fn len(&self) -> usize {
        self.host_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.host_vars.is_empty()
    }
}

/// Evaluates compiled expressions into values.
pub trait ValueFetch: Send + Sync {
    /// Borrow the value when the expression already holds one.
    fn peek<'a>(&self, expr: &'a RegExpr, vd: &'a ValDescr) -> ScanResult<Cow<'a, DbValue>>;

    /// An owned copy of the value.
    fn copy(&self, expr: &RegExpr, vd: &ValDescr) -> ScanResult<DbValue> {
        self.peek(expr, vd).map(Cow::into_owned)
    }
}

/// Resolves constants and host variables; composite expressions are
/// built from their operands.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorFetch;

impl ValueFetch for DescriptorFetch {
    fn peek<'a>(&self, expr: &'a RegExpr, vd: &'a ValDescr) -> ScanResult<Cow<'a, DbValue>> {
        match expr {
            RegExpr::Constant(value) => Ok(Cow::Borrowed(value)),
            RegExpr::HostVar(slot) => vd.get(*slot).map(Cow::Borrowed).ok_or_else(|| {
                ScanError::invalid_plan(format!("host variable {} is not bound", slot))
            }),
            RegExpr::Midxkey(ops) => {
                let cols = ops
                    .iter()
                    .map(|op| self.copy(op, vd))
                    .collect::<ScanResult<Vec<_>>>()?;
                Ok(Cow::Owned(DbValue::Midxkey(cols)))
            }
            RegExpr::Sequence(ops) => {
                let elems = ops
                    .iter()
                    .map(|op| self.copy(op, vd))
                    .collect::<ScanResult<Vec<_>>>()?;
                Ok(Cow::Owned(DbValue::Set(elems)))
            }
        }
    }
}
