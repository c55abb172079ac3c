//! Scan layer configuration
//!
//! Loaded once per process from a JSON file (or built from defaults) and
//! shared read-only by every cursor through [`crate::ScanEnv`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Collation, Oid};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables of the scan layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Database page size in bytes.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pages worth of OIDs held by one OID buffer.
    #[serde(default = "default_oid_buffer_pages")]
    pub oid_buffer_pages: usize,

    /// Most buffers the OID pool keeps around (max concurrent transactions).
    #[serde(default = "default_oid_pool_cap")]
    pub oid_pool_cap: usize,

    /// Buffers allocated when the pool starts.
    #[serde(default = "default_oid_pool_prealloc")]
    pub oid_pool_prealloc: usize,

    /// Largest key limit for which the top-N multi-range optimization is used.
    #[serde(default = "default_multi_range_opt_limit")]
    pub multi_range_opt_limit: usize,

    /// Sort every OID buffer by physical order before heap access.
    #[serde(default)]
    pub index_scan_in_oid_order: bool,

    /// Compare strings ignoring trailing spaces (key deduplication excepted).
    #[serde(default)]
    pub ignore_trailing_space: bool,

    /// Treat empty variable strings in index keys as NULL.
    #[serde(default)]
    pub oracle_style_empty_string: bool,
}

fn default_page_size() -> usize {
    16 * 1024
}
fn default_oid_buffer_pages() -> usize {
    4
}
fn default_oid_pool_cap() -> usize {
    100
}
fn default_oid_pool_prealloc() -> usize {
    10
}
fn default_multi_range_opt_limit() -> usize {
    100
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            oid_buffer_pages: default_oid_buffer_pages(),
            oid_pool_cap: default_oid_pool_cap(),
            oid_pool_prealloc: default_oid_pool_prealloc(),
            multi_range_opt_limit: default_multi_range_opt_limit(),
            index_scan_in_oid_order: false,
            ignore_trailing_space: false,
            oracle_style_empty_string: false,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: ScanConfig = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be > 0".into(),
            });
        }

        if self.oid_buffer_capacity() == 0 {
            return Err(ConfigError::Invalid {
                field: "oid_buffer_pages",
                reason: format!(
                    "{} pages of {} bytes hold no OID",
                    self.oid_buffer_pages, self.page_size
                ),
            });
        }

        if self.oid_pool_prealloc > self.oid_pool_cap {
            return Err(ConfigError::Invalid {
                field: "oid_pool_prealloc",
                reason: format!(
                    "{} exceeds oid_pool_cap {}",
                    self.oid_pool_prealloc, self.oid_pool_cap
                ),
            });
        }

        Ok(())
    }

    /// OIDs that fit in one pooled buffer.
    pub fn oid_buffer_capacity(&self) -> usize {
        self.page_size.saturating_mul(self.oid_buffer_pages) / std::mem::size_of::<Oid>()
    }

    pub fn collation(&self) -> Collation {
        Collation::from_flag(self.ignore_trailing_space)
    }
}
