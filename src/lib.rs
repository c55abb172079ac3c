//! scanmgr - row access layer of a relational engine
//!
//! Turns compiled access plans into filtered, ordered streams of rows:
//! heap scans, B-tree index range scans (with key limits, skip scan and
//! the top-N multi-range optimization), list file scans and scans over
//! derived values.

pub mod collab;
pub mod config;
pub mod filter;
pub mod index;
pub mod observability;
pub mod plan;
pub mod pool;
pub mod range;
pub mod scan;
pub mod value;

pub use collab::ScanEnv;
pub use config::ScanConfig;
pub use pool::OidBufferPool;
pub use scan::{ScanCode, ScanCursor, ScanError, ScanOptions, ScanResult};
