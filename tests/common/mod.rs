//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use scanmgr::collab::{
    BtreeIndex, FetchMode, HeapGet, HeapRecord, HeapStorage, IndexEntry, IndexInfo, LockManager,
    LockMode, LockOutcome, LockWait, Lsa, PageId,
};
use scanmgr::plan::HeapFileId;
use scanmgr::range::KeyValRange;
use scanmgr::value::{Collation, DbValue, Oid};
use scanmgr::{OidBufferPool, ScanCode, ScanConfig, ScanCursor, ScanEnv, ScanResult};

// =============================================================================
// Values
// =============================================================================

pub fn int(v: i32) -> DbValue {
    DbValue::Integer(v)
}

pub fn pair(a: i32, b: i32) -> DbValue {
    DbValue::Midxkey(vec![int(a), int(b)])
}

pub fn oid(page: i32, slot: i16) -> Oid {
    Oid::new(0, page, slot)
}

// =============================================================================
// B-tree
// =============================================================================

/// Sorted entries walked in the index's per-column directions.
pub struct MemIndex {
    info: IndexInfo,
    entries: Vec<IndexEntry>,
}

impl MemIndex {
    pub fn new(info: IndexInfo, mut entries: Vec<IndexEntry>) -> Self {
        let desc = info.desc_columns.clone();
        entries.sort_by(|a, b| traversal_order(&desc, &a.key, &b.key));
        Self { info, entries }
    }

    /// Single-column index on attribute 0.
    pub fn scalar(entries: impl IntoIterator<Item = (i32, Vec<Oid>)>) -> Arc<Self> {
        Arc::new(Self::new(
            IndexInfo::new("i_t_a", vec![0]),
            entries
                .into_iter()
                .map(|(k, oids)| IndexEntry::new(int(k), oids))
                .collect(),
        ))
    }

    /// Two-column index on attributes 0 and 1.
    pub fn composite(
        desc: Vec<bool>,
        entries: impl IntoIterator<Item = ((i32, i32), Oid)>,
    ) -> Arc<Self> {
        Arc::new(Self::new(
            IndexInfo::new("i_t_ab", vec![0, 1]).with_desc_columns(desc),
            entries
                .into_iter()
                .map(|((a, b), oid)| IndexEntry::new(pair(a, b), vec![oid]))
                .collect(),
        ))
    }
}

fn traversal_order(desc: &[bool], a: &DbValue, b: &DbValue) -> Ordering {
    let width = match (a, b) {
        (DbValue::Midxkey(x), DbValue::Midxkey(y)) => x.len().max(y.len()),
        _ => 1,
    };
    for col in 0..width {
        let (Some(x), Some(y)) = (a.column(col), b.column(col)) else {
            continue;
        };
        let mut ord = x.total_cmp(y, Collation::Strict);
        if desc.get(col).copied().unwrap_or(false) {
            ord = ord.reverse();
        }
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl BtreeIndex for MemIndex {
    fn info(&self) -> &IndexInfo {
        &self.info
    }

    fn next_key(
        &self,
        range: &KeyValRange,
        after: Option<&DbValue>,
        reverse: bool,
    ) -> ScanResult<Option<IndexEntry>> {
        let desc = &self.info.desc_columns;
        let past = |key: &DbValue| match after {
            None => true,
            Some(prev) => {
                let ord = traversal_order(desc, key, prev);
                if reverse {
                    ord == Ordering::Less
                } else {
                    ord == Ordering::Greater
                }
            }
        };
        let hit = |e: &&IndexEntry| past(&e.key) && range.contains(&e.key, Collation::Strict);
        let found = if reverse {
            self.entries.iter().rev().find(hit)
        } else {
            self.entries.iter().find(hit)
        };
        Ok(found.cloned())
    }

    fn key_info(&self, key: &DbValue) -> ScanResult<Option<Vec<DbValue>>> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.key.strict_eq(key))
            .map(|e| vec![e.key.clone(), DbValue::BigInt(e.oids.len() as i64)]))
    }

    fn node_info(&self) -> ScanResult<Vec<Vec<DbValue>>> {
        Ok(vec![
            vec![DbValue::string("root"), DbValue::BigInt(1)],
            vec![DbValue::string("leaf"), DbValue::BigInt(self.entries.len() as i64)],
        ])
    }
}

// =============================================================================
// Heap
// =============================================================================

#[derive(Debug, Clone)]
enum Slot {
    Row { attrs: Vec<DbValue>, version: u64 },
    Invisible,
    Corrupt,
}

/// Heap file keyed by OID; pages are the distinct page ids in use.
#[derive(Default)]
pub struct MemHeap {
    slots: BTreeMap<Oid, Slot>,
    /// Newer committed versions, returned by `get_last_version`.
    latest: Mutex<HashMap<Oid, (Vec<DbValue>, u64)>>,
    lsa: Mutex<HashMap<PageId, u64>>,
    class_attrs: HashMap<Oid, Vec<DbValue>>,
}

impl MemHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, oid: Oid, attrs: Vec<DbValue>) -> Self {
        self.slots.insert(oid, Slot::Row { attrs, version: 1 });
        self
    }

    /// Fill page `page` with one row per element of `rows`.
    pub fn with_page(mut self, page: i32, rows: Vec<Vec<DbValue>>) -> Self {
        for (slot, attrs) in rows.into_iter().enumerate() {
            self.slots
                .insert(oid(page, slot as i16), Slot::Row { attrs, version: 1 });
        }
        self
    }

    pub fn with_invisible(mut self, oid: Oid) -> Self {
        self.slots.insert(oid, Slot::Invisible);
        self
    }

    pub fn with_corrupt(mut self, oid: Oid) -> Self {
        self.slots.insert(oid, Slot::Corrupt);
        self
    }

    pub fn with_class_attrs(mut self, class_oid: Oid, attrs: Vec<DbValue>) -> Self {
        self.class_attrs.insert(class_oid, attrs);
        self
    }

    /// Simulate a concurrent update committed after the snapshot.
    pub fn update_latest(&self, oid: Oid, attrs: Vec<DbValue>) {
        self.latest.lock().unwrap().insert(oid, (attrs, 2));
    }

    pub fn touch_page(&self, page: PageId) {
        *self.lsa.lock().unwrap().entry(page).or_insert(0) += 1;
    }

    fn page_lsa_of(&self, page: PageId) -> Lsa {
        Lsa(self.lsa.lock().unwrap().get(&page).copied().unwrap_or(0))
    }

    fn record(&self, oid: Oid, attrs: Vec<DbValue>, version: u64) -> HeapRecord {
        HeapRecord {
            oid,
            lsa: self.page_lsa_of(oid.pageid),
            version,
            attrs,
        }
    }
}

impl HeapStorage for MemHeap {
    fn pages(&self, _hfid: HeapFileId) -> ScanResult<Vec<PageId>> {
        let pages: HashSet<PageId> = self.slots.keys().map(|o| o.pageid).collect();
        let mut pages: Vec<_> = pages.into_iter().collect();
        pages.sort_unstable();
        Ok(pages)
    }

    fn slots(&self, _hfid: HeapFileId, page: PageId) -> ScanResult<Vec<Oid>> {
        Ok(self.slots.keys().filter(|o| o.pageid == page).copied().collect())
    }

    fn page_lsa(&self, oid: Oid) -> ScanResult<Lsa> {
        Ok(self.page_lsa_of(oid.pageid))
    }

    fn page_header(&self, _hfid: HeapFileId, page: PageId) -> ScanResult<Vec<DbValue>> {
        let records = self.slots.keys().filter(|o| o.pageid == page).count();
        Ok(vec![DbValue::Integer(page), DbValue::BigInt(records as i64)])
    }

    fn get_visible_version(&self, oid: Oid, _class: Oid, _mode: FetchMode) -> ScanResult<HeapGet> {
        Ok(match self.slots.get(&oid) {
            None => HeapGet::DoesntExist,
            Some(Slot::Invisible) => HeapGet::SnapshotNotSatisfied,
            Some(Slot::Corrupt) => HeapGet::Corrupt("bad slot header".into()),
            Some(Slot::Row { attrs, version }) => {
                HeapGet::Visible(self.record(oid, attrs.clone(), *version))
            }
        })
    }

    fn get_last_version(&self, oid: Oid, class: Oid) -> ScanResult<HeapGet> {
        if let Some((attrs, version)) = self.latest.lock().unwrap().get(&oid).cloned() {
            return Ok(HeapGet::Visible(self.record(oid, attrs, version)));
        }
        self.get_visible_version(oid, class, FetchMode::Copy)
    }

    fn class_attributes(&self, class_oid: Oid) -> ScanResult<Option<Vec<DbValue>>> {
        Ok(self.class_attrs.get(&class_oid).cloned())
    }
}

// =============================================================================
// Locks
// =============================================================================

/// Conditional requests on `contended` OIDs would block once.
#[derive(Default)]
pub struct ScriptedLocks {
    contended: Mutex<HashSet<Oid>>,
    pub granted: Mutex<Vec<Oid>>,
}

impl ScriptedLocks {
    pub fn contend(&self, oid: Oid) {
        self.contended.lock().unwrap().insert(oid);
    }
}

impl LockManager for ScriptedLocks {
    fn lock(&self, oid: Oid, _class: Oid, _mode: LockMode, wait: LockWait) -> ScanResult<LockOutcome> {
        if wait == LockWait::Conditional && self.contended.lock().unwrap().remove(&oid) {
            return Ok(LockOutcome::WouldBlock);
        }
        self.granted.lock().unwrap().push(oid);
        Ok(LockOutcome::Granted)
    }
}

// =============================================================================
// Environment
// =============================================================================

pub fn config() -> ScanConfig {
    ScanConfig {
        oid_pool_cap: 4,
        oid_pool_prealloc: 1,
        ..ScanConfig::default()
    }
}

pub fn env_with(config: ScanConfig, heap: Arc<MemHeap>) -> Arc<ScanEnv> {
    let pool = OidBufferPool::init(&config).unwrap();
    Arc::new(ScanEnv::new(config, pool, heap))
}

pub fn env(heap: MemHeap) -> Arc<ScanEnv> {
    env_with(config(), Arc::new(heap))
}

/// Run `next` until `End`, collecting the value lists.
pub fn drain(cursor: &mut ScanCursor) -> Vec<Vec<DbValue>> {
    let mut rows = Vec::new();
    while cursor.next().unwrap() == ScanCode::Success {
        rows.push(cursor.values().to_vec());
    }
    rows
}

/// First column of every row, as integers.
pub fn firsts(rows: &[Vec<DbValue>]) -> Vec<i32> {
    rows.iter()
        .map(|row| match row.first() {
            Some(DbValue::Integer(v)) => *v,
            other => panic!("expected an integer, got {:?}", other),
        })
        .collect()
}
