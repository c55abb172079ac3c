//! OID buffer pool
//!
//! Index scans collect object identifiers into fixed-capacity buffers. The
//! pool keeps released buffers for reuse so a busy server does not allocate
//! one per scan.
//!
//! # Invariants
//!
//! - A buffer is owned by exactly one scan or sits in the pool, never both
//! - Buffer capacity is fixed at allocation
//! - The pool never retains more than `cap` buffers; extra releases free
//!   the buffer immediately
//! - The pool mutex is held only for one pop or push

mod buffer_pool;
mod errors;
mod oid_list;

pub use buffer_pool::{OidBufferPool, PooledOidList};
pub use errors::{PoolError, PoolErrorCode, PoolResult};
pub use oid_list::OidList;
