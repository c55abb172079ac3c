//! Index Scan Tests
//!
//! Tests for index cursors end to end:
//! - Range, key list and descending walks
//! - Key limits and the top-N multi-range optimization
//! - Index skip scan over distinct leading values
//! - Covering scans, OID ordering and grouped batches
//! - Inconsistent index entries and row locking

mod common;

use std::sync::Arc;

use scanmgr::collab::{IndexEntry, IndexInfo};
use scanmgr::filter::{Logical, RowContext};
use scanmgr::index::KeyLimits;
use scanmgr::plan::{
    IndexAccess, KeyInfo, KeyLimitOrigin, KeyRange, RegExpr, ScanAttrs, ScanPred, SortColumn,
    ValDescr,
};
use scanmgr::range::{RangeKind, RangeShape};
use scanmgr::scan::{ScanErrorCode, ScanOp};
use scanmgr::value::{DbValue, Oid};
use scanmgr::{OidBufferPool, ScanCode, ScanConfig, ScanCursor, ScanEnv, ScanOptions, ScanResult};

use common::{config, drain, env, env_with, firsts, int, oid, MemHeap, MemIndex, ScriptedLocks};

// =============================================================================
// Helper Functions
// =============================================================================

const CLASS: Oid = Oid {
    volid: 0,
    pageid: 0,
    slotid: 1,
};

/// Keys 1..=5 on page 1, slot `k - 1` holding row `[k]`.
fn scalar_fixture() -> (MemHeap, Arc<MemIndex>) {
    let heap = MemHeap::new().with_page(1, (1..=5).map(|k| vec![int(k)]).collect());
    let index = MemIndex::scalar((1..=5).map(|k| (k, vec![oid(1, (k - 1) as i16)])));
    (heap, index)
}

/// Composite `(a, b)` entries; entry `i` lives at page 1, slot `i`.
fn composite_fixture(desc: Vec<bool>, keys: &[(i32, i32)]) -> (MemHeap, Arc<MemIndex>) {
    let heap = MemHeap::new().with_page(1, keys.iter().map(|(a, b)| vec![int(*a), int(*b)]).collect());
    let index = MemIndex::composite(
        desc,
        keys.iter()
            .enumerate()
            .map(|(i, key)| (*key, oid(1, i as i16))),
    );
    (heap, index)
}

fn access(shape: RangeShape, ranges: Vec<KeyRange>, width: usize) -> IndexAccess {
    let mut access = IndexAccess::new(CLASS, shape, KeyInfo::new(ranges));
    access.rest_attrs = ScanAttrs::new((0..width).collect());
    access
}

fn c(v: i32) -> Option<RegExpr> {
    Some(RegExpr::constant(v))
}

fn open(env: Arc<ScanEnv>, access: IndexAccess, index: Arc<MemIndex>) -> ScanCursor {
    let mut cursor =
        ScanCursor::open_index(env, Arc::new(access), index, ScanOptions::default()).unwrap();
    cursor.start().unwrap();
    cursor
}

fn pairs(rows: &[Vec<DbValue>]) -> Vec<(i32, i32)> {
    rows.iter()
        .map(|row| match row.as_slice() {
            [DbValue::Integer(a), DbValue::Integer(b)] => (*a, *b),
            other => panic!("expected two integers, got {:?}", other),
        })
        .collect()
}

fn attr_gt(attr: usize, bound: i32) -> ScanPred {
    ScanPred::new(move |row: &RowContext<'_>| -> ScanResult<Logical> {
        Ok(match row.attr(attr) {
            DbValue::Integer(v) => Logical::from(*v > bound),
            _ => Logical::Unknown,
        })
    })
}

// =============================================================================
// Ranges
// =============================================================================

/// A bounded range returns the matching rows in key order.
#[test]
fn test_range_scan() {
    let (heap, index) = scalar_fixture();
    let access = access(
        RangeShape::Range,
        vec![KeyRange::new(RangeKind::GtLe, c(1), c(4))],
        1,
    );

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3, 4]);
    assert_eq!(cursor.stats().qualified_rows, 3);
}

/// Overlapping ranges of a range list are merged before the search.
#[test]
fn test_range_list_merges() {
    let (heap, index) = scalar_fixture();
    let access = access(
        RangeShape::RangeList,
        vec![
            KeyRange::new(RangeKind::GeLe, c(3), c(5)),
            KeyRange::new(RangeKind::GeLt, c(1), c(4)),
        ],
        1,
    );

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![1, 2, 3, 4, 5]);
}

/// Key lists are deduplicated; a NULL key selects nothing.
#[test]
fn test_key_list_dedup_and_null() {
    let (heap, index) = scalar_fixture();
    let access = access(
        RangeShape::KeyList,
        vec![
            KeyRange::eq(RegExpr::constant(4)),
            KeyRange::eq(RegExpr::Constant(DbValue::Null)),
            KeyRange::eq(RegExpr::constant(2)),
            KeyRange::eq(RegExpr::constant(4)),
        ],
        1,
    );

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 4]);
}

/// Keys of different domains are searched in domain order; those that
/// cannot match an integer key select nothing.
#[test]
fn test_key_list_mixed_domains() {
    let (heap, index) = scalar_fixture();
    let access = access(
        RangeShape::KeyList,
        vec![
            KeyRange::eq(RegExpr::Constant(DbValue::Double(4.0))),
            KeyRange::eq(RegExpr::Constant(DbValue::string("x"))),
            KeyRange::eq(RegExpr::Constant(DbValue::Double(f64::NAN))),
            KeyRange::eq(RegExpr::constant(2)),
            KeyRange::eq(RegExpr::constant(4)),
        ],
        1,
    );

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 4]);
}

/// Host variables bind key values at start.
#[test]
fn test_key_from_host_variable() {
    let (heap, index) = scalar_fixture();
    let access = access(RangeShape::Key, vec![KeyRange::eq(RegExpr::HostVar(0))], 1);

    let mut cursor = ScanCursor::open_index(
        env(heap),
        Arc::new(access),
        index,
        ScanOptions::default().with_vd(ValDescr::new(vec![int(3)])),
    )
    .unwrap();
    cursor.start().unwrap();
    assert_eq!(firsts(&drain(&mut cursor)), vec![3]);

    // Rebinding and restarting searches the new key.
    cursor.end();
    cursor.vd_mut().set(0, int(5));
    cursor.start().unwrap();
    assert_eq!(firsts(&drain(&mut cursor)), vec![5]);
}

/// A descending walk returns keys from the top.
#[test]
fn test_descending_walk() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.use_desc_index = true;

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![5, 4, 3, 2, 1]);
}

/// Key and data filters both apply; only the key filter avoids the heap.
#[test]
fn test_key_and_data_filters() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.key_pred = attr_gt(0, 1);
    access.key_attrs = ScanAttrs::new(vec![0]);
    access.data_pred = ScanPred::new(|row: &RowContext<'_>| -> ScanResult<Logical> {
        Ok(Logical::from(row.attr(0) != &int(4)))
    });
    access.data_attrs = ScanAttrs::new(vec![0]);

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3, 5]);

    let stats = cursor.stats();
    assert_eq!(stats.read_keys, 5);
    assert_eq!(stats.qualified_keys, 4);
    // six index lookups, four heap reads
    assert_eq!(stats.fetches, 10);
}

/// Index entries whose object is gone are skipped.
#[test]
fn test_missing_object_skipped() {
    let heap = MemHeap::new().with_row(oid(1, 0), vec![int(1)]).with_invisible(oid(1, 1));
    let index = MemIndex::scalar([(1, vec![oid(1, 0)]), (2, vec![oid(1, 1)]), (3, vec![oid(1, 2)])]);

    let mut cursor = open(env(heap), access(RangeShape::Range, vec![KeyRange::all()], 1), index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![1]);
}

// =============================================================================
// Key Limits
// =============================================================================

/// The lower limit skips, the upper limit caps, counted per OID.
#[test]
fn test_key_limits_paginate() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.key_info = access.key_info.with_limits(c(1), c(2), KeyLimitOrigin::User);

    let mut cursor = open(env(heap), access, index);
    assert_eq!(
        cursor.key_limits(),
        Some(KeyLimits {
            lower: Some(1),
            upper: Some(2)
        })
    );
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3]);
}

/// A negative limit written by the user is rejected at start.
#[test]
fn test_negative_user_limit_rejected() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.key_info = access.key_info.with_limits(None, c(-1), KeyLimitOrigin::User);

    let mut cursor =
        ScanCursor::open_index(env(heap), Arc::new(access), index, ScanOptions::default()).unwrap();
    let err = cursor.start().unwrap_err();
    assert_eq!(err.code(), ScanErrorCode::ScanInvalidKeyLimit);
}

/// A negative derived lower limit shrinks the upper limit instead.
#[test]
fn test_negative_derived_lower_folds() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.key_info = access.key_info.with_limits(c(-1), c(3), KeyLimitOrigin::Derived);

    let mut cursor = open(env(heap), access, index);
    assert_eq!(
        cursor.key_limits(),
        Some(KeyLimits {
            lower: Some(0),
            upper: Some(2)
        })
    );
    assert_eq!(firsts(&drain(&mut cursor)), vec![1, 2]);
}

/// Top-N across a key list keeps the best rows of all keys.
#[test]
fn test_multi_range_top_n() {
    let (heap, index) = composite_fixture(
        vec![false, false],
        &[(1, 9), (1, 4), (2, 1), (2, 7), (3, 3), (3, 5)],
    );
    let ranges = (1..=3)
        .map(|a| KeyRange::eq(RegExpr::Midxkey(vec![RegExpr::constant(a)])))
        .collect();
    let mut access = access(RangeShape::KeyList, ranges, 2);
    access.key_info = access.key_info.with_limits(None, c(2), KeyLimitOrigin::Derived);
    access.key_info.limit_reset = true;
    access.mro_sort = vec![SortColumn::asc(1)];

    let mut cursor = open(env(heap), access, index);
    assert!(cursor.uses_multi_range_opt());
    assert_eq!(pairs(&drain(&mut cursor)), vec![(2, 1), (3, 3)]);
    assert!(cursor.stats().multi_range_opt);
}

/// Without sort columns the optimization stays off and every key
/// contributes up to the limit.
#[test]
fn test_multi_range_needs_sort_columns() {
    let (heap, index) = composite_fixture(
        vec![false, false],
        &[(1, 9), (1, 4), (1, 6), (2, 1), (2, 7)],
    );
    let ranges = (1..=2)
        .map(|a| KeyRange::eq(RegExpr::Midxkey(vec![RegExpr::constant(a)])))
        .collect();
    let mut access = access(RangeShape::KeyList, ranges, 2);
    access.key_info = access.key_info.with_limits(None, c(2), KeyLimitOrigin::Derived);
    access.key_info.limit_reset = true;

    let mut cursor = open(env(heap), access, index);
    assert!(!cursor.uses_multi_range_opt());
    assert_eq!(pairs(&drain(&mut cursor)), vec![(1, 4), (1, 6), (2, 1), (2, 7)]);
}

/// Fixture for per-key limits: key 2 holds three OIDs, key 4 two and key
/// 6 one; each heap row holds its slot number.
fn limit_fixture() -> (MemHeap, Arc<MemIndex>) {
    let heap = MemHeap::new().with_page(1, (0..8).map(|s| vec![int(s)]).collect());
    let index = MemIndex::scalar([
        (2, vec![oid(1, 1), oid(1, 2), oid(1, 3)]),
        (4, vec![oid(1, 5), oid(1, 6)]),
        (6, vec![oid(1, 7)]),
    ]);
    (heap, index)
}

fn limited_key_list(limit_reset: bool) -> IndexAccess {
    let mut access = access(
        RangeShape::KeyList,
        vec![
            KeyRange::eq(RegExpr::constant(4)),
            KeyRange::eq(RegExpr::Constant(DbValue::Null)),
            KeyRange::eq(RegExpr::constant(2)),
            KeyRange::eq(RegExpr::constant(6)),
            KeyRange::eq(RegExpr::Constant(DbValue::Null)),
        ],
        1,
    );
    access.key_info = access.key_info.with_limits(None, c(2), KeyLimitOrigin::Derived);
    access.key_info.limit_reset = limit_reset;
    access
}

/// With a per-key reset every key gets the full upper limit, NULL keys
/// in the list included.
#[test]
fn test_limit_reset_per_key() {
    let (heap, index) = limit_fixture();

    let mut cursor = open(env(heap), limited_key_list(true), index);
    assert!(!cursor.uses_multi_range_opt());
    assert_eq!(firsts(&drain(&mut cursor)), vec![1, 2, 5, 6, 7]);
}

/// Without the reset the upper limit is shared by the whole list.
#[test]
fn test_limit_shared_across_keys() {
    let (heap, index) = limit_fixture();

    let mut cursor = open(env(heap), limited_key_list(false), index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![1, 2]);
}

// =============================================================================
// Index Skip Scan
// =============================================================================

const ISS_KEYS: [(i32, i32); 6] = [(1, 1), (1, 2), (3, 1), (3, 5), (7, 0), (7, 2)];

fn iss_access(desc_walk: bool) -> IndexAccess {
    // Column 0 is a placeholder the skip scan fills in.
    let key = RegExpr::Midxkey(vec![RegExpr::constant(0), RegExpr::constant(2)]);
    let mut access = access(RangeShape::Key, vec![KeyRange::eq(key)], 2);
    access.key_info.use_iss = true;
    access.use_desc_index = desc_walk;
    access
}

/// Every distinct leading value is searched once, ascending.
#[test]
fn test_skip_scan_forward() {
    let (heap, index) = composite_fixture(vec![false, false], &ISS_KEYS);

    let mut cursor = open(env(heap), iss_access(false), index);
    assert_eq!(pairs(&drain(&mut cursor)), vec![(1, 2), (7, 2)]);
    assert!(cursor.stats().index_skip_scan);
}

/// Walking the index backwards visits leading values from the top.
#[test]
fn test_skip_scan_backward() {
    let (heap, index) = composite_fixture(vec![false, false], &ISS_KEYS);

    let mut cursor = open(env(heap), iss_access(true), index);
    assert_eq!(pairs(&drain(&mut cursor)), vec![(7, 2), (1, 2)]);
}

/// A descending leading column is walked in its own order.
#[test]
fn test_skip_scan_descending_column() {
    let (heap, index) = composite_fixture(vec![true, false], &ISS_KEYS);

    let mut cursor = open(env(heap), iss_access(false), index);
    assert_eq!(pairs(&drain(&mut cursor)), vec![(7, 2), (1, 2)]);
}

/// Under skip scan every key of a key list is searched for each leading
/// value.
#[test]
fn test_skip_scan_key_list() {
    let (heap, index) = composite_fixture(vec![false, false], &ISS_KEYS);
    let keys = [2, 5]
        .into_iter()
        .map(|b| KeyRange::eq(RegExpr::Midxkey(vec![RegExpr::constant(0), RegExpr::constant(b)])))
        .collect();
    let mut access = access(RangeShape::KeyList, keys, 2);
    access.key_info.use_iss = true;

    let mut cursor = open(env(heap), access, index);
    assert_eq!(pairs(&drain(&mut cursor)), vec![(1, 2), (3, 5), (7, 2)]);
    assert!(cursor.stats().index_skip_scan);
}

/// Under skip scan every range of a range list is searched for each
/// leading value.
#[test]
fn test_skip_scan_range_list() {
    let (heap, index) = composite_fixture(vec![false, false], &ISS_KEYS);
    let bound = |b: i32| Some(RegExpr::Midxkey(vec![RegExpr::constant(0), RegExpr::constant(b)]));
    let ranges = vec![
        KeyRange::new(RangeKind::GeLe, bound(5), bound(9)),
        KeyRange::new(RangeKind::GeLe, bound(1), bound(2)),
    ];
    let mut access = access(RangeShape::RangeList, ranges, 2);
    access.key_info.use_iss = true;

    let mut cursor = open(env(heap), access, index);
    assert_eq!(
        pairs(&drain(&mut cursor)),
        vec![(1, 1), (1, 2), (3, 1), (3, 5), (7, 2)]
    );
}

/// Skip scan needs a composite index.
#[test]
fn test_skip_scan_on_single_column_rejected() {
    let (heap, index) = scalar_fixture();
    let mut access = access(RangeShape::Key, vec![KeyRange::eq(RegExpr::constant(1))], 1);
    access.key_info.use_iss = true;

    let err = ScanCursor::open_index(env(heap), Arc::new(access), index, ScanOptions::default())
        .unwrap_err();
    assert_eq!(err.code(), ScanErrorCode::ScanInvalidPlan);
}

// =============================================================================
// Covering, Ordering, Batches
// =============================================================================

/// A covering scan builds rows from key columns and never reads the heap.
#[test]
fn test_covering_scan() {
    let (_, index) = composite_fixture(vec![false, false], &[(1, 10), (2, 20)]);
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 0);
    access.covering = Some(vec![1, 0]);

    let mut cursor = open(env(MemHeap::new()), access, index);
    assert_eq!(pairs(&drain(&mut cursor)), vec![(10, 1), (20, 2)]);
    assert!(cursor.stats().covered_index);
}

/// Covering columns must exist in the index.
#[test]
fn test_covering_column_out_of_range() {
    let (_, index) = scalar_fixture();
    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 0);
    access.covering = Some(vec![3]);

    let err = ScanCursor::open_index(env(MemHeap::new()), Arc::new(access), index, ScanOptions::default())
        .unwrap_err();
    assert_eq!(err.code(), ScanErrorCode::ScanInvalidPlan);
}

/// With OID ordering each batch is read in physical order.
#[test]
fn test_oid_order() {
    let heap = MemHeap::new()
        .with_row(oid(1, 0), vec![int(2)])
        .with_row(oid(2, 0), vec![int(3)])
        .with_row(oid(3, 0), vec![int(1)]);
    let index = MemIndex::scalar([
        (1, vec![oid(3, 0)]),
        (2, vec![oid(1, 0)]),
        (3, vec![oid(2, 0)]),
    ]);
    let config = ScanConfig {
        index_scan_in_oid_order: true,
        ..config()
    };

    let mut cursor = open(
        env_with(config, Arc::new(heap)),
        access(RangeShape::Range, vec![KeyRange::all()], 1),
        index,
    );
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3, 1]);
}

/// A grouped scan hands out one OID batch per block.
#[test]
fn test_grouped_batches() {
    let (heap, index) = scalar_fixture();
    // Two OIDs per buffer.
    let config = ScanConfig {
        page_size: 16,
        oid_buffer_pages: 1,
        ..config()
    };
    let env = env_with(config, Arc::new(heap));
    assert_eq!(env.oid_pool().buffer_capacity(), 2);

    let access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    let mut cursor = ScanCursor::open_index(
        env,
        Arc::new(access),
        index,
        ScanOptions::default().grouped(),
    )
    .unwrap();
    cursor.start().unwrap();

    let mut blocks = Vec::new();
    while cursor.next_scan_block().unwrap() == ScanCode::Success {
        blocks.push(firsts(&drain(&mut cursor)));
    }
    assert_eq!(blocks, vec![vec![1, 2], vec![3, 4], vec![5]]);
}

/// Key 2 holds three OIDs, more than one buffer of two.
fn crowded_key_list(grouped: bool) -> ScanCursor {
    let heap = MemHeap::new().with_page(1, [10, 20, 21, 22, 30].map(|v| vec![int(v)]).to_vec());
    let index = MemIndex::scalar([
        (1, vec![oid(1, 0)]),
        (2, vec![oid(1, 1), oid(1, 2), oid(1, 3)]),
        (3, vec![oid(1, 4)]),
    ]);
    let config = ScanConfig {
        page_size: 16,
        oid_buffer_pages: 1,
        ..config()
    };
    let access = access(
        RangeShape::KeyList,
        vec![KeyRange::eq(RegExpr::constant(3)), KeyRange::eq(RegExpr::constant(2))],
        1,
    );
    let options = if grouped {
        ScanOptions::default().grouped()
    } else {
        ScanOptions::default()
    };

    let mut cursor = ScanCursor::open_index(
        env_with(config, Arc::new(heap)),
        Arc::new(access),
        index,
        options,
    )
    .unwrap();
    cursor.start().unwrap();
    cursor
}

/// A key list entry that overflows the buffer resumes where it stopped.
#[test]
fn test_key_list_entry_spans_buffers() {
    let mut cursor = crowded_key_list(false);
    assert_eq!(firsts(&drain(&mut cursor)), vec![20, 21, 22, 30]);
}

/// Grouped, the overflowing entry is split across blocks.
#[test]
fn test_key_list_entry_spans_blocks() {
    let mut cursor = crowded_key_list(true);

    let mut blocks = Vec::new();
    while cursor.next_scan_block().unwrap() == ScanCode::Success {
        blocks.push(firsts(&drain(&mut cursor)));
    }
    assert_eq!(blocks, vec![vec![20, 21], vec![22], vec![30]]);
}

/// Rewinding an ungrouped scan reads the same rows again.
#[test]
fn test_reset_block_rereads() {
    let (heap, index) = scalar_fixture();
    let access = access(
        RangeShape::Range,
        vec![KeyRange::new(RangeKind::GeLe, c(2), c(3))],
        1,
    );

    let mut cursor = open(env(heap), access, index);
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3]);
    cursor.reset_scan_block().unwrap();
    assert_eq!(firsts(&drain(&mut cursor)), vec![2, 3]);
}

// =============================================================================
// Failures and Locking
// =============================================================================

/// An index entry pointing at a corrupt slot is a fatal error.
#[test]
fn test_inconsistent_index_is_fatal() {
    let heap = MemHeap::new().with_corrupt(oid(9, 9));
    let index = MemIndex::scalar([(1, vec![oid(9, 9)])]);

    let mut cursor = open(env(heap), access(RangeShape::Range, vec![KeyRange::all()], 1), index);
    let err = cursor.next().unwrap_err();
    assert_eq!(err.code(), ScanErrorCode::ScanInconsistentIndex);
    assert!(err.is_fatal());
    assert_eq!(err.oid(), Some(oid(9, 9)));
}

/// With empty strings stored as NULL, an object whose key column became
/// empty is not returned under its old key.
#[test]
fn test_oracle_empty_string() {
    let heap = MemHeap::new()
        .with_row(oid(1, 0), vec![DbValue::string("")])
        .with_row(oid(1, 1), vec![DbValue::string("y")]);
    let entries = vec![
        IndexEntry::new(DbValue::string("x"), vec![oid(1, 0)]),
        IndexEntry::new(DbValue::string("y"), vec![oid(1, 1)]),
    ];
    let index = Arc::new(MemIndex::new(
        IndexInfo::new("i_t_s", vec![0]).with_vstr_columns(vec![0]),
        entries,
    ));
    let heap = Arc::new(heap);
    let scan_all = || access(RangeShape::Range, vec![KeyRange::all()], 1);

    let oracle = ScanConfig {
        oracle_style_empty_string: true,
        ..config()
    };
    let mut cursor = open(env_with(oracle, Arc::clone(&heap)), scan_all(), Arc::clone(&index));
    assert_eq!(drain(&mut cursor), vec![vec![DbValue::string("y")]]);

    let mut cursor = open(env_with(config(), heap), scan_all(), index);
    assert_eq!(drain(&mut cursor).len(), 2);
}

/// Update scans lock each row and recheck versions changed concurrently.
#[test]
fn test_update_scan_locks_and_reevaluates() {
    let (heap, index) = scalar_fixture();
    let heap = Arc::new(heap);
    // Key 4 no longer qualifies after a concurrent update, key 5 does.
    heap.update_latest(oid(1, 3), vec![int(0)]);
    heap.update_latest(oid(1, 4), vec![int(50)]);

    let locks = Arc::new(ScriptedLocks::default());
    locks.contend(oid(1, 2));

    let config = config();
    let pool = OidBufferPool::init(&config).unwrap();
    let env = Arc::new(ScanEnv::new(config, pool, heap).with_locks(locks.clone()));

    let mut access = access(RangeShape::Range, vec![KeyRange::all()], 1);
    access.data_pred = attr_gt(0, 2);
    access.data_attrs = ScanAttrs::new(vec![0]);

    let mut cursor = ScanCursor::open_index(
        env,
        Arc::new(access),
        index,
        ScanOptions::default().with_op(ScanOp::Update),
    )
    .unwrap();
    cursor.start().unwrap();

    assert_eq!(firsts(&drain(&mut cursor)), vec![3, 50]);
    assert_eq!(cursor.stats().lock_waits, 1);
    assert_eq!(
        *locks.granted.lock().unwrap(),
        vec![oid(1, 2), oid(1, 3), oid(1, 4)]
    );
}

/// Select scans take no locks.
#[test]
fn test_select_scan_takes_no_locks() {
    let (heap, index) = scalar_fixture();
    let locks = Arc::new(ScriptedLocks::default());
    let config = config();
    let pool = OidBufferPool::init(&config).unwrap();
    let env = Arc::new(ScanEnv::new(config, pool, Arc::new(heap)).with_locks(locks.clone()));

    let mut cursor = open(env, access(RangeShape::Range, vec![KeyRange::all()], 1), index);
    assert_eq!(drain(&mut cursor).len(), 5);
    assert!(locks.granted.lock().unwrap().is_empty());
}
