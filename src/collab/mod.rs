//! Collaborators the scan layer drives
//!
//! B-tree search, heap storage, locking and MVCC reevaluation are owned
//! elsewhere; cursors reach them only through these traits, bundled in a
//! [`ScanEnv`].

mod btree;
mod env;
mod heap;
mod list_file;
mod lock;
mod reeval;
mod row_source;

pub use btree::{BtreeIndex, IndexEntry, IndexInfo};
pub use env::ScanEnv;
pub use heap::{FetchMode, HeapGet, HeapRecord, HeapStorage, Lsa, PageId};
pub use list_file::ListFile;
pub use lock::{LockManager, LockMode, LockOutcome, LockWait, NoLocks};
pub use reeval::{FilterReevaluator, MvccReevaluator, ReevalFilters};
pub use row_source::{RowSource, VecRowSource};
