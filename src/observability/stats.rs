//! Per-scan diagnostics
//!
//! Counters are observational only; nothing in the scan reads them back.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::scope::Timer;

/// Counters collected by one cursor between `start` and `close`.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub started_at: Option<DateTime<Utc>>,
    timer: Timer,
    /// Heap record and index key fetches
    pub fetches: u64,
    /// Page loads
    pub ioreads: u64,
    /// Candidate rows looked at
    pub read_rows: u64,
    /// Rows returned to the caller
    pub qualified_rows: u64,
    /// Index keys visited
    pub read_keys: u64,
    /// Index keys passing the key filter
    pub qualified_keys: u64,
    /// Unconditional lock waits
    pub lock_waits: u64,
    /// Set for index scans; selects the index text layout
    pub index_scan: bool,
    pub covered_index: bool,
    pub multi_range_opt: bool,
    pub index_skip_scan: bool,
}

impl ScanStats {
    pub fn new(index_scan: bool) -> Self {
        Self {
            index_scan,
            ..Self::default()
        }
    }

    /// Start or resume timing.
    pub fn resume(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.timer.resume();
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.timer.elapsed().as_millis()
    }

    /// Structured export, one key per counter.
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "started_at": self.started_at.map(|t| t.to_rfc3339()),
            "time_ms": self.elapsed_ms() as u64,
            "fetch": self.fetches,
            "ioread": self.ioreads,
            "readrows": self.read_rows,
            "rows": self.qualified_rows,
            "lock_waits": self.lock_waits,
        });

        if self.index_scan {
            value["readkeys"] = json!(self.read_keys);
            value["filteredkeys"] = json!(self.qualified_keys);
            value["covered"] = json!(self.covered_index);
            value["mro"] = json!(self.multi_range_opt);
            value["iss"] = json!(self.index_skip_scan);
        }

        value
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(time: {}, fetch: {}, ioread: {}, readrows: {}, rows: {})",
            self.elapsed_ms(),
            self.fetches,
            self.ioreads,
            self.read_rows,
            self.qualified_rows
        )?;

        if self.index_scan {
            write!(
                f,
                " (readkeys: {}, filteredkeys: {}",
                self.read_keys, self.qualified_keys
            )?;
            if self.covered_index {
                write!(f, ", covered: true")?;
            }
            if self.multi_range_opt {
                write!(f, ", mro: true")?;
            }
            if self.index_skip_scan {
                write!(f, ", iss: true")?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_text_layout() {
        let mut stats = ScanStats::new(false);
        stats.fetches = 4;
        stats.read_rows = 4;
        stats.qualified_rows = 2;
        let text = stats.to_string();
        assert!(text.starts_with("(time: "));
        assert!(text.contains("fetch: 4"));
        assert!(text.contains("rows: 2)"));
        assert!(!text.contains("readkeys"));
    }

    #[test]
    fn test_index_text_layout() {
        let mut stats = ScanStats::new(true);
        stats.read_keys = 10;
        stats.qualified_keys = 3;
        stats.covered_index = true;
        let text = stats.to_string();
        assert!(text.contains("(readkeys: 10, filteredkeys: 3, covered: true)"));
    }

    #[test]
    fn test_json_export() {
        let mut stats = ScanStats::new(true);
        stats.resume();
        stats.qualified_rows = 7;
        stats.multi_range_opt = true;
        stats.pause();

        let json = stats.to_json();
        assert_eq!(json["rows"], 7);
        assert_eq!(json["mro"], true);
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_heap_json_has_no_index_keys() {
        let json = ScanStats::new(false).to_json();
        assert!(json.get("readkeys").is_none());
        assert!(json["started_at"].is_null());
    }
}
