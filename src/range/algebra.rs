//! Sorting, deduplication and merging of key range lists

use std::cmp::Ordering;

use super::key_range::{KeyValRange, RangeShape};
use super::kind::{EndpointOrder, RangeKind, RangeOp};
use crate::value::{Collation, DbValue};

/// Order two range endpoints, distinguishing adjacency from overlap.
///
/// Infinite endpoints are decided from their operator alone; the value is
/// never looked at.
pub fn compare_endpoints(
    v1: &DbValue,
    op1: RangeOp,
    v2: &DbValue,
    op2: RangeOp,
    collation: Collation,
) -> EndpointOrder {
    order_endpoints(op1, op2, || v1.compare(v2, collation))
}

/// Endpoint order for sorting: values of different domains are ordered by
/// [`DbValue::total_cmp`] instead of reported as `Na`.
fn sort_endpoints(
    v1: &DbValue,
    op1: RangeOp,
    v2: &DbValue,
    op2: RangeOp,
    collation: Collation,
) -> Ordering {
    as_ordering(order_endpoints(op1, op2, || Some(v1.total_cmp(v2, collation))))
}

fn order_endpoints(
    op1: RangeOp,
    op2: RangeOp,
    values: impl FnOnce() -> Option<Ordering>,
) -> EndpointOrder {
    use EndpointOrder as E;

    if op1 == RangeOp::GtInf {
        return if op1 == op2 { E::Eq } else { E::Lt };
    }
    if op1 == RangeOp::LtInf {
        return if op1 == op2 { E::Eq } else { E::Gt };
    }
    if op2 == RangeOp::GtInf {
        return E::Gt;
    }
    if op2 == RangeOp::LtInf {
        return E::Lt;
    }

    match values() {
        None => E::Na,
        Some(Ordering::Less) => E::Lt,
        Some(Ordering::Greater) => E::Gt,
        Some(Ordering::Equal) => {
            if op1 == op2 {
                return E::Eq;
            }
            match op1 {
                op if op.is_inclusive() => {
                    if op2.is_inclusive() {
                        E::Eq
                    } else if op2 == RangeOp::Gt {
                        E::LtAdj
                    } else {
                        E::GtAdj
                    }
                }
                RangeOp::Gt => {
                    if op2.is_inclusive() {
                        E::GtAdj
                    } else if op2 == RangeOp::Lt {
                        E::Gt
                    } else {
                        E::Eq
                    }
                }
                RangeOp::Lt => {
                    if op2.is_inclusive() {
                        E::LtAdj
                    } else if op2 == RangeOp::Gt {
                        E::Lt
                    } else {
                        E::Eq
                    }
                }
                _ => E::Eq,
            }
        }
    }
}

fn as_ordering(order: EndpointOrder) -> Ordering {
    match order {
        EndpointOrder::Lt | EndpointOrder::LtAdj => Ordering::Less,
        EndpointOrder::Gt | EndpointOrder::GtAdj => Ordering::Greater,
        EndpointOrder::Eq | EndpointOrder::Na => Ordering::Equal,
    }
}

/// Sort a key list and drop repeated keys.
///
/// Equality here always treats trailing whitespace as significant. Keys of
/// different domains are sorted by domain and never dropped.
pub fn dedup_keys(keys: &mut Vec<KeyValRange>) {
    if keys.len() <= 1 {
        return;
    }

    keys.sort_by(|a, b| a.key1.total_cmp(&b.key1, Collation::Strict));
    keys.dedup_by(|next, kept| next.key1.strict_eq(&kept.key1));
}

/// Sort a range list by lower bound and merge ranges that overlap or touch.
///
/// `Na` ranges never merge; they are kept after the usable ranges so the
/// driver can skip them. Ranges whose bounds are incomparable are sorted
/// by domain and left unmerged.
pub fn merge_ranges(ranges: &mut Vec<KeyValRange>, collation: Collation) {
    if ranges.len() <= 1 {
        return;
    }

    for r in ranges.iter_mut() {
        if r.kind == RangeKind::Eq {
            r.kind = RangeKind::GeLe;
            r.key2 = r.key1.clone();
        }
    }

    ranges.sort_by(|a, b| match (a.is_na(), b.is_na()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let (v1, op1) = a.lower();
            let (v2, op2) = b.lower();
            sort_endpoints(v1, op1, v2, op2, collation)
        }
    });

    let mut merged: Vec<KeyValRange> = Vec::with_capacity(ranges.len());
    for next in ranges.drain(..) {
        match merged.last_mut() {
            Some(cur) if !cur.is_na() && !next.is_na() => {
                if let Some(union) = try_merge(cur, &next, collation) {
                    *cur = union;
                } else {
                    merged.push(next);
                }
            }
            _ => merged.push(next),
        }
    }
    *ranges = merged;
}

/// Union of two ranges, or `None` if they are disjoint or incomparable.
fn try_merge(cur: &KeyValRange, next: &KeyValRange, collation: Collation) -> Option<KeyValRange> {
    let (cur_lo, cur_lo_op) = cur.lower();
    let (cur_hi, cur_hi_op) = cur.upper();
    let (next_lo, next_lo_op) = next.lower();
    let (next_hi, next_hi_op) = next.upper();

    // cur must reach next from below
    let touch = compare_endpoints(cur_hi, cur_hi_op, next_lo, next_lo_op, collation);
    if matches!(touch, EndpointOrder::Na | EndpointOrder::Lt) {
        return None;
    }
    let reach = compare_endpoints(cur_lo, cur_lo_op, next_hi, next_hi_op, collation);
    if matches!(reach, EndpointOrder::Na | EndpointOrder::Gt) {
        return None;
    }
    let lows = compare_endpoints(cur_lo, cur_lo_op, next_lo, next_lo_op, collation);
    let highs = compare_endpoints(cur_hi, cur_hi_op, next_hi, next_hi_op, collation);
    if lows == EndpointOrder::Na || highs == EndpointOrder::Na {
        return None;
    }

    let (key1, lo_op) = if matches!(lows, EndpointOrder::GtAdj | EndpointOrder::Gt) {
        (next_lo.clone(), next_lo_op)
    } else {
        (cur_lo.clone(), cur_lo_op)
    };
    let (key2, hi_op) = if matches!(highs, EndpointOrder::Lt | EndpointOrder::LtAdj) {
        (next_hi.clone(), next_hi_op)
    } else {
        (cur_hi.clone(), cur_hi_op)
    };

    Some(KeyValRange {
        kind: RangeKind::from_ops(lo_op, hi_op),
        key1,
        key2,
        is_truncated: cur.is_truncated || next.is_truncated,
        num_index_term: cur.num_index_term.max(next.num_index_term),
    })
}

/// Bring an evaluated range list into canonical search order.
///
/// Key lists are deduplicated, range lists merged. When the scan walks the
/// index backwards to satisfy a descending ORDER BY / GROUP BY, the list is
/// reversed as well.
pub fn canonicalize(
    ranges: &mut Vec<KeyValRange>,
    shape: RangeShape,
    descending_skip: bool,
    collation: Collation,
) {
    match shape {
        RangeShape::KeyList => dedup_keys(ranges),
        RangeShape::RangeList => merge_ranges(ranges, collation),
        RangeShape::Key | RangeShape::Range => return,
    }

    if descending_skip {
        ranges.reverse();
    }
}
