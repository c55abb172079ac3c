//! DbValue, Oid and domain-aware comparison

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical locator of one stored row.
///
/// Ordered by volume, then page, then slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Oid {
    pub volid: i16,
    pub pageid: i32,
    pub slotid: i16,
}

impl Oid {
    /// The "no object" locator.
    pub const NULL: Oid = Oid {
        volid: -1,
        pageid: -1,
        slotid: -1,
    };

    pub fn new(volid: i16, pageid: i32, slotid: i16) -> Self {
        Self {
            volid,
            pageid,
            slotid,
        }
    }

    pub fn is_null(&self) -> bool {
        self.pageid == Oid::NULL.pageid
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}|{}|{})", self.volid, self.pageid, self.slotid)
    }
}

/// String comparison rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    /// Trailing whitespace is significant.
    #[default]
    Strict,
    /// `'abc  '` equals `'abc'`.
    IgnoreTrailingSpace,
}

impl Collation {
    pub fn from_flag(ignore_trailing_space: bool) -> Self {
        if ignore_trailing_space {
            Collation::IgnoreTrailingSpace
        } else {
            Collation::Strict
        }
    }
}

/// Type tag of a [`DbValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    Null,
    Integer,
    BigInt,
    Double,
    String,
    Oid,
    Set,
    Midxkey,
    Json,
}

impl DbType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Null => "NULL",
            DbType::Integer => "INTEGER",
            DbType::BigInt => "BIGINT",
            DbType::Double => "DOUBLE",
            DbType::String => "VARCHAR",
            DbType::Oid => "OBJECT",
            DbType::Set => "SET",
            DbType::Midxkey => "MIDXKEY",
            DbType::Json => "JSON",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed database value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DbValue {
    #[default]
    Null,
    Integer(i32),
    BigInt(i64),
    Double(f64),
    String(String),
    Oid(Oid),
    /// Unordered collection, iterated by set scans.
    Set(Vec<DbValue>),
    /// Composite index key, one value per index column.
    Midxkey(Vec<DbValue>),
    Json(serde_json::Value),
}

impl DbValue {
    pub fn string(s: impl Into<String>) -> Self {
        DbValue::String(s.into())
    }

    pub fn db_type(&self) -> DbType {
        match self {
            DbValue::Null => DbType::Null,
            DbValue::Integer(_) => DbType::Integer,
            DbValue::BigInt(_) => DbType::BigInt,
            DbValue::Double(_) => DbType::Double,
            DbValue::String(_) => DbType::String,
            DbValue::Oid(_) => DbType::Oid,
            DbValue::Set(_) => DbType::Set,
            DbValue::Midxkey(_) => DbType::Midxkey,
            DbValue::Json(_) => DbType::Json,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// True for NULL and for composite keys holding a NULL column.
    ///
    /// Such keys never match an index entry in a range search.
    pub fn has_null_component(&self) -> bool {
        match self {
            DbValue::Null => true,
            DbValue::Midxkey(cols) => cols.iter().any(DbValue::is_null),
            _ => false,
        }
    }

    /// Column `idx` of a composite key, or the value itself for column 0
    /// of a scalar key.
    pub fn column(&self, idx: usize) -> Option<&DbValue> {
        match self {
            DbValue::Midxkey(cols) => cols.get(idx),
            other if idx == 0 => Some(other),
            _ => None,
        }
    }

    /// Compare two values by domain.
    ///
    /// Returns `None` when the values are incomparable.
    pub fn compare(&self, other: &DbValue, collation: Collation) -> Option<Ordering> {
        self.compare_columns(other, usize::MAX, collation)
    }

    /// Like [`DbValue::compare`], but composite keys only compare their
    /// first `columns` columns.
    pub fn compare_columns(
        &self,
        other: &DbValue,
        columns: usize,
        collation: Collation,
    ) -> Option<Ordering> {
        use DbValue::*;

        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(a), BigInt(b)) => Some(i64::from(*a).cmp(b)),
            (BigInt(a), Integer(b)) => Some(a.cmp(&i64::from(*b))),
            (BigInt(a), BigInt(b)) => Some(a.cmp(b)),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (Double(a), Integer(b)) => cmp_int_double(i64::from(*b), *a).map(Ordering::reverse),
            (Integer(a), Double(b)) => cmp_int_double(i64::from(*a), *b),
            (Double(a), BigInt(b)) => cmp_int_double(*b, *a).map(Ordering::reverse),
            (BigInt(a), Double(b)) => cmp_int_double(*a, *b),
            (String(a), String(b)) => Some(compare_strings(a, b, collation)),
            (Oid(a), Oid(b)) => Some(a.cmp(b)),
            (Midxkey(a), Midxkey(b)) | (Set(a), Set(b)) => {
                compare_sequences(a, b, columns, collation)
            }
            (Json(a), Json(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Total order over all values, for sorting.
    ///
    /// Agrees with [`DbValue::compare`] wherever that returns an ordering.
    /// Incomparable values are ordered by domain: NULL, numbers, NaN,
    /// strings, OIDs, sets, composite keys, JSON.
    pub fn total_cmp(&self, other: &DbValue, collation: Collation) -> Ordering {
        use DbValue::*;

        let (ra, rb) = (self.sort_rank(), other.sort_rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Set(a), Set(b)) | (Midxkey(a), Midxkey(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.total_cmp(y, collation))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Json(a), Json(b)) => a.to_string().cmp(&b.to_string()),
            _ => self.compare(other, collation).unwrap_or(Ordering::Equal),
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            DbValue::Null => 0,
            DbValue::Double(d) if d.is_nan() => 2,
            DbValue::Integer(_) | DbValue::BigInt(_) | DbValue::Double(_) => 1,
            DbValue::String(_) => 3,
            DbValue::Oid(_) => 4,
            DbValue::Set(_) => 5,
            DbValue::Midxkey(_) => 6,
            DbValue::Json(_) => 7,
        }
    }

    /// Exact equality with trailing whitespace significant.
    pub fn strict_eq(&self, other: &DbValue) -> bool {
        self.compare(other, Collation::Strict) == Some(Ordering::Equal)
    }
}

/// Exact comparison of an integer with a double; `None` for NaN.
fn cmp_int_double(i: i64, d: f64) -> Option<Ordering> {
    const TWO_63: f64 = 9_223_372_036_854_775_808.0;
    if d.is_nan() {
        return None;
    }
    if d >= TWO_63 {
        return Some(Ordering::Less);
    }
    if d < -TWO_63 {
        return Some(Ordering::Greater);
    }
    let whole = d.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if d > whole => Some(Ordering::Less),
        Ordering::Equal if d < whole => Some(Ordering::Greater),
        ord => Some(ord),
    }
}

fn compare_strings(a: &str, b: &str, collation: Collation) -> Ordering {
    match collation {
        Collation::Strict => a.cmp(b),
        Collation::IgnoreTrailingSpace => a.trim_end_matches(' ').cmp(b.trim_end_matches(' ')),
    }
}

fn compare_sequences(
    a: &[DbValue],
    b: &[DbValue],
    columns: usize,
    collation: Collation,
) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b.iter()).take(columns) {
        match x.compare(y, collation)? {
            Ordering::Equal => continue,
            ord => return Some(ord),
        }
    }

    let n = columns.min(a.len().max(b.len()));
    if a.len() >= n && b.len() >= n {
        Some(Ordering::Equal)
    } else {
        // A shorter key is a prefix of the longer one
        Some(a.len().min(n).cmp(&b.len().min(n)))
    }
}

impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => write!(f, "NULL"),
            DbValue::Integer(v) => write!(f, "{}", v),
            DbValue::BigInt(v) => write!(f, "{}", v),
            DbValue::Double(v) => write!(f, "{}", v),
            DbValue::String(v) => write!(f, "'{}'", v),
            DbValue::Oid(v) => write!(f, "{}", v),
            DbValue::Json(v) => write!(f, "{}", v),
            DbValue::Set(vals) | DbValue::Midxkey(vals) => {
                write!(f, "{{")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i32> for DbValue {
    fn from(v: i32) -> Self {
        DbValue::Integer(v)
    }
}

impl From<i64> for DbValue {
    fn from(v: i64) -> Self {
        DbValue::BigInt(v)
    }
}

impl From<&str> for DbValue {
    fn from(v: &str) -> Self {
        DbValue::String(v.to_string())
    }
}
