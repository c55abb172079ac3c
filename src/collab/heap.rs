//! Heap storage seam

use std::fmt;

use crate::plan::HeapFileId;
use crate::scan::ScanResult;
use crate::value::{DbValue, Oid};

pub type PageId = i32;

/// Page log sequence address; changes whenever the page is modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lsa(pub u64);

impl fmt::Display for Lsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lsa:{}", self.0)
    }
}

/// One version of a stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapRecord {
    pub oid: Oid,
    /// Page version when the record was read.
    pub lsa: Lsa,
    /// Object version; differs between the snapshot and the latest version
    /// when a concurrent transaction updated the object.
    pub version: u64,
    pub attrs: Vec<DbValue>,
}

/// Outcome of a versioned heap read.
#[derive(Debug, Clone, PartialEq)]
pub enum HeapGet {
    Visible(HeapRecord),
    /// The object exists but no version is visible to the snapshot.
    SnapshotNotSatisfied,
    /// The object was deleted and its slot reclaimed.
    DoesntExist,
    /// The slot holds something that is not a valid object.
    Corrupt(String),
}

/// Whether the caller may keep a reference into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Valid only while the page stays latched.
    Peek,
    /// Detached copy that survives page release.
    Copy,
}

pub trait HeapStorage: Send + Sync {
    /// Pages of a heap file in physical order.
    fn pages(&self, hfid: HeapFileId) -> ScanResult<Vec<PageId>>;

    /// Object slots of one page in slot order.
    fn slots(&self, hfid: HeapFileId, page: PageId) -> ScanResult<Vec<Oid>>;

    /// Current version of the page holding `oid`.
    fn page_lsa(&self, oid: Oid) -> ScanResult<Lsa>;

    /// Header row of one page.
    fn page_header(&self, hfid: HeapFileId, page: PageId) -> ScanResult<Vec<DbValue>>;

    /// Version of `oid` visible to the current snapshot.
    fn get_visible_version(&self, oid: Oid, class_oid: Oid, mode: FetchMode)
        -> ScanResult<HeapGet>;

    /// Most recent committed version of `oid`, read after locking it.
    fn get_last_version(&self, oid: Oid, class_oid: Oid) -> ScanResult<HeapGet>;

    /// Attribute values stored for a class object.
    fn class_attributes(&self, class_oid: Oid) -> ScanResult<Option<Vec<DbValue>>>;
}
