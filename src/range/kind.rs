//! Range kinds and endpoint operators

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of one key range.
///
/// The first half names the lower endpoint, the second half the upper one:
/// `GeLt` is `[key1, key2)`, `InfLe` is `(-inf, key2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKind {
    /// Empty or unusable range.
    Na,
    /// Single key, `key1 = v`.
    Eq,
    GeLe,
    GeLt,
    GtLe,
    GtLt,
    GeInf,
    GtInf,
    InfLe,
    InfLt,
    InfInf,
}

/// Endpoint operator of a range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Na,
    Eq,
    Ge,
    Gt,
    /// Virtual lower bound, negative infinity.
    GtInf,
    Le,
    Lt,
    /// Virtual upper bound, positive infinity.
    LtInf,
}

/// Refined ordering of two range endpoints.
///
/// `LtAdj`/`GtAdj` mark endpoints that sit on the same value but touch
/// without overlapping, e.g. `x <= 10` against `x > 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointOrder {
    /// Incomparable endpoints.
    Na,
    Lt,
    LtAdj,
    Eq,
    GtAdj,
    Gt,
}

impl RangeKind {
    /// Split a range into its lower and upper endpoint operators.
    pub fn to_ops(self) -> (RangeOp, RangeOp) {
        use RangeKind as K;
        use RangeOp as O;

        match self {
            K::Na => (O::Na, O::Na),
            K::Eq => (O::Eq, O::Na),
            K::GeLe => (O::Ge, O::Le),
            K::GeLt => (O::Ge, O::Lt),
            K::GtLe => (O::Gt, O::Le),
            K::GtLt => (O::Gt, O::Lt),
            K::GeInf => (O::Ge, O::LtInf),
            K::GtInf => (O::Gt, O::LtInf),
            K::InfLe => (O::GtInf, O::Le),
            K::InfLt => (O::GtInf, O::Lt),
            K::InfInf => (O::GtInf, O::LtInf),
        }
    }

    /// Rebuild a range from endpoint operators. Unknown pairs yield `Na`.
    pub fn from_ops(lower: RangeOp, upper: RangeOp) -> RangeKind {
        use RangeKind as K;
        use RangeOp as O;

        match (lower, upper) {
            (O::Eq, O::Na) => K::Eq,
            (O::Ge, O::Le) => K::GeLe,
            (O::Ge, O::Lt) => K::GeLt,
            (O::Gt, O::Le) => K::GtLe,
            (O::Gt, O::Lt) => K::GtLt,
            (O::Ge, O::LtInf) => K::GeInf,
            (O::Gt, O::LtInf) => K::GtInf,
            (O::GtInf, O::Le) => K::InfLe,
            (O::GtInf, O::Lt) => K::InfLt,
            (O::GtInf, O::LtInf) => K::InfInf,
            _ => K::Na,
        }
    }

    /// Ranges with two finite bounds.
    pub fn is_bounded(self) -> bool {
        matches!(self, RangeKind::GeLe | RangeKind::GeLt | RangeKind::GtLe | RangeKind::GtLt)
    }

    /// Ranges open towards positive infinity.
    pub fn has_infinite_upper(self) -> bool {
        matches!(self, RangeKind::GeInf | RangeKind::GtInf | RangeKind::InfInf)
    }

    /// Ranges open towards negative infinity.
    pub fn has_infinite_lower(self) -> bool {
        matches!(self, RangeKind::InfLe | RangeKind::InfLt | RangeKind::InfInf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKind::Na => "NA",
            RangeKind::Eq => "EQ",
            RangeKind::GeLe => "GE_LE",
            RangeKind::GeLt => "GE_LT",
            RangeKind::GtLe => "GT_LE",
            RangeKind::GtLt => "GT_LT",
            RangeKind::GeInf => "GE_INF",
            RangeKind::GtInf => "GT_INF",
            RangeKind::InfLe => "INF_LE",
            RangeKind::InfLt => "INF_LT",
            RangeKind::InfInf => "INF_INF",
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RangeOp {
    /// Inclusive finite endpoint.
    pub fn is_inclusive(self) -> bool {
        matches!(self, RangeOp::Eq | RangeOp::Ge | RangeOp::Le)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RangeKind; 11] = [
        RangeKind::Na,
        RangeKind::Eq,
        RangeKind::GeLe,
        RangeKind::GeLt,
        RangeKind::GtLe,
        RangeKind::GtLt,
        RangeKind::GeInf,
        RangeKind::GtInf,
        RangeKind::InfLe,
        RangeKind::InfLt,
        RangeKind::InfInf,
    ];

    #[test]
    fn test_ops_table_round_trips() {
        for kind in ALL {
            let (lower, upper) = kind.to_ops();
            assert_eq!(RangeKind::from_ops(lower, upper), kind, "{}", kind);
        }
    }

    #[test]
    fn test_unknown_pair_is_na() {
        assert_eq!(RangeKind::from_ops(RangeOp::Le, RangeOp::Ge), RangeKind::Na);
        assert_eq!(RangeKind::from_ops(RangeOp::Eq, RangeOp::Lt), RangeKind::Na);
        assert_eq!(RangeKind::from_ops(RangeOp::Na, RangeOp::Eq), RangeKind::Na);
    }

    #[test]
    fn test_infinite_sides() {
        assert!(RangeKind::GtInf.has_infinite_upper());
        assert!(!RangeKind::GtInf.has_infinite_lower());
        assert!(RangeKind::InfInf.has_infinite_lower());
        assert!(RangeKind::GtLt.is_bounded());
    }
}
