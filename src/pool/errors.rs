//! OID buffer pool errors
//!
//! Error codes:
//! - POOL_OUT_OF_MEMORY (ERROR)
//! - POOL_INVALID_CAPACITY (ERROR)

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolErrorCode {
    /// A new buffer could not be allocated
    PoolOutOfMemory,
    /// Buffers were configured to hold no OIDs
    PoolInvalidCapacity,
}

impl PoolErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PoolErrorCode::PoolOutOfMemory => "POOL_OUT_OF_MEMORY",
            PoolErrorCode::PoolInvalidCapacity => "POOL_INVALID_CAPACITY",
        }
    }
}

impl fmt::Display for PoolErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug)]
pub struct PoolError {
    code: PoolErrorCode,
    message: String,
}

impl PoolError {
    pub fn out_of_memory(capacity: usize) -> Self {
        Self {
            code: PoolErrorCode::PoolOutOfMemory,
            message: format!("cannot allocate OID buffer of {} entries", capacity),
        }
    }

    pub fn invalid_capacity() -> Self {
        Self {
            code: PoolErrorCode::PoolInvalidCapacity,
            message: "OID buffers must hold at least one entry".to_string(),
        }
    }

    pub fn code(&self) -> PoolErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)
    }
}

impl std::error::Error for PoolError {}

pub type PoolResult<T> = Result<T, PoolError>;
