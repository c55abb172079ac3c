//! Scan error types
//!
//! Error codes:
//! - SCAN_INVALID_PLAN (ERROR)
//! - SCAN_OUT_OF_MEMORY (ERROR)
//! - SCAN_CANT_COERCE (ERROR)
//! - SCAN_INVALID_DATATYPE (ERROR)
//! - SCAN_INVALID_KEY_LIMIT (ERROR)
//! - SCAN_LOCK_FAILED (ERROR)
//! - SCAN_UNKNOWN_POSITION (ERROR)
//! - SCAN_INTERRUPTED (ERROR)
//! - SCAN_UNSUPPORTED (ERROR)
//! - SCAN_COLLABORATOR_FAILED (ERROR)
//! - SCAN_INCONSISTENT_INDEX (FATAL)
//!
//! Every error aborts the statement. Rows returned by earlier `next` calls
//! stay valid.

use std::fmt;

use crate::pool::{PoolError, PoolErrorCode};
use crate::value::{CoerceError, Oid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The statement fails, the system is healthy
    Error,
    /// Index and heap disagree; storage needs attention
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorCode {
    /// Plan fragment has the wrong shape
    ScanInvalidPlan,
    /// Allocation failed
    ScanOutOfMemory,
    /// Value cannot be converted to the required domain
    ScanCantCoerce,
    /// Value has the wrong type
    ScanInvalidDatatype,
    /// Negative user-supplied key limit
    ScanInvalidKeyLimit,
    /// Lock could not be acquired
    ScanLockFailed,
    /// Cursor position is corrupt
    ScanUnknownPosition,
    /// Immediate-stop flag raised
    ScanInterrupted,
    /// Operation not available for this scan kind
    ScanUnsupported,
    /// Heap, B-tree, evaluator or row source failed
    ScanCollaboratorFailed,
    /// Heap failed on an OID read from an index (FATAL)
    ScanInconsistentIndex,
}

impl ScanErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ScanErrorCode::ScanInvalidPlan => "SCAN_INVALID_PLAN",
            ScanErrorCode::ScanOutOfMemory => "SCAN_OUT_OF_MEMORY",
            ScanErrorCode::ScanCantCoerce => "SCAN_CANT_COERCE",
            ScanErrorCode::ScanInvalidDatatype => "SCAN_INVALID_DATATYPE",
            ScanErrorCode::ScanInvalidKeyLimit => "SCAN_INVALID_KEY_LIMIT",
            ScanErrorCode::ScanLockFailed => "SCAN_LOCK_FAILED",
            ScanErrorCode::ScanUnknownPosition => "SCAN_UNKNOWN_POSITION",
            ScanErrorCode::ScanInterrupted => "SCAN_INTERRUPTED",
            ScanErrorCode::ScanUnsupported => "SCAN_UNSUPPORTED",
            ScanErrorCode::ScanCollaboratorFailed => "SCAN_COLLABORATOR_FAILED",
            ScanErrorCode::ScanInconsistentIndex => "SCAN_INCONSISTENT_INDEX",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ScanErrorCode::ScanInconsistentIndex => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ScanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct ScanError {
    code: ScanErrorCode,
    message: String,
    oid: Option<Oid>,
}

impl ScanError {
    fn new(code: ScanErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            oid: None,
        }
    }

    pub fn invalid_plan(reason: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ScanInvalidPlan, reason.into())
    }

    pub fn out_of_memory(reason: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ScanOutOfMemory, reason.into())
    }

    pub fn cant_coerce(reason: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ScanCantCoerce, reason.into())
    }

    pub fn invalid_datatype(reason: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ScanInvalidDatatype, reason.into())
    }

    pub fn invalid_key_limit(value: i64) -> Self {
        Self::new(
            ScanErrorCode::ScanInvalidKeyLimit,
            format!("key limit must not be negative, got {}", value),
        )
    }

    pub fn lock_failed(oid: Oid, reason: impl Into<String>) -> Self {
        Self {
            oid: Some(oid),
            ..Self::new(ScanErrorCode::ScanLockFailed, reason.into())
        }
    }

    pub fn unknown_position() -> Self {
        Self::new(
            ScanErrorCode::ScanUnknownPosition,
            "cursor position is not before, on or after a row".into(),
        )
    }

    pub fn interrupted() -> Self {
        Self::new(ScanErrorCode::ScanInterrupted, "scan stopped on request".into())
    }

    pub fn unsupported(operation: &str, kind: &str) -> Self {
        Self::new(
            ScanErrorCode::ScanUnsupported,
            format!("{} is not supported by {} scans", operation, kind),
        )
    }

    pub fn collaborator(component: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ScanErrorCode::ScanCollaboratorFailed,
            format!("{}: {}", component, reason),
        )
    }

    pub fn inconsistent_index(oid: Oid, reason: impl Into<String>) -> Self {
        Self {
            oid: Some(oid),
            ..Self::new(ScanErrorCode::ScanInconsistentIndex, reason.into())
        }
    }

    pub fn code(&self) -> ScanErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Object the error is about, if any.
    pub fn oid(&self) -> Option<Oid> {
        self.oid
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(oid) = self.oid {
            write!(f, " [oid {}]", oid)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanError {}

impl From<PoolError> for ScanError {
    fn from(err: PoolError) -> Self {
        match err.code() {
            PoolErrorCode::PoolOutOfMemory => ScanError::out_of_memory(err.message()),
            PoolErrorCode::PoolInvalidCapacity => ScanError::invalid_plan(err.message()),
        }
    }
}

impl From<CoerceError> for ScanError {
    fn from(err: CoerceError) -> Self {
        match err {
            CoerceError::Null { .. } => ScanError::invalid_datatype(err.to_string()),
            CoerceError::Incompatible { .. } => ScanError::cant_coerce(err.to_string()),
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DbType;

    #[test]
    fn test_error_codes() {
        assert_eq!(ScanErrorCode::ScanInvalidPlan.code(), "SCAN_INVALID_PLAN");
        assert_eq!(ScanErrorCode::ScanInconsistentIndex.code(), "SCAN_INCONSISTENT_INDEX");
    }

    #[test]
    fn test_inconsistent_index_is_fatal() {
        let err = ScanError::inconsistent_index(Oid::new(0, 3, 4), "heap read failed");
        assert!(err.is_fatal());
        assert_eq!(err.oid(), Some(Oid::new(0, 3, 4)));
        assert!(err.to_string().contains("[oid (0|3|4)]"));
    }

    #[test]
    fn test_plan_error_not_fatal() {
        let err = ScanError::invalid_plan("missing key ranges");
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "[ERROR] SCAN_INVALID_PLAN: missing key ranges");
    }

    #[test]
    fn test_from_pool_error() {
        let err: ScanError = PoolError::out_of_memory(10).into();
        assert_eq!(err.code(), ScanErrorCode::ScanOutOfMemory);

        let err: ScanError = PoolError::invalid_capacity().into();
        assert_eq!(err.code(), ScanErrorCode::ScanInvalidPlan);
    }

    #[test]
    fn test_from_coerce_error() {
        let null: ScanError = CoerceError::Null { to: DbType::BigInt }.into();
        assert_eq!(null.code(), ScanErrorCode::ScanInvalidDatatype);

        let bad: ScanError = CoerceError::Incompatible {
            from: DbType::Json,
            to: DbType::BigInt,
        }
        .into();
        assert_eq!(bad.code(), ScanErrorCode::ScanCantCoerce);
    }
}
