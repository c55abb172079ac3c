//! Locking of qualified rows under MVCC
//!
//! Update and delete scans lock each object that passed the filters. When
//! the lock had to wait, or the latest version is not the one that was
//! filtered, the locked version is checked again before it is returned.

use crate::collab::{
    FetchMode, HeapGet, HeapRecord, LockMode, LockOutcome, LockWait, ReevalFilters, ScanEnv,
};
use crate::observability::{log_event, Event, ScanStats};
use crate::plan::ValDescr;
use crate::value::{DbValue, Oid};

use super::errors::{ScanError, ScanResult};

/// Outcome of locking one qualified row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Locked {
    /// The version to return.
    Row(HeapRecord),
    /// The object is gone or no longer qualifies.
    Skip,
}

fn visible(get: HeapGet) -> ScanResult<Option<HeapRecord>> {
    match get {
        HeapGet::Visible(record) => Ok(Some(record)),
        HeapGet::SnapshotNotSatisfied | HeapGet::DoesntExist => Ok(None),
        HeapGet::Corrupt(reason) => Err(ScanError::collaborator("heap", reason)),
    }
}

pub(crate) fn lock_and_reevaluate(
    env: &ScanEnv,
    snapshot: HeapRecord,
    class_oid: Oid,
    filters: &ReevalFilters<'_>,
    values: &[DbValue],
    vd: &ValDescr,
    stats: &mut ScanStats,
) -> ScanResult<Locked> {
    let oid = snapshot.oid;
    let mut snapshot = snapshot;

    let outcome = env
        .locks()
        .lock(oid, class_oid, LockMode::Exclusive, LockWait::Conditional)?;
    if outcome == LockOutcome::WouldBlock {
        stats.lock_waits += 1;
        let outcome = env
            .locks()
            .lock(oid, class_oid, LockMode::Exclusive, LockWait::Unconditional)?;
        if outcome == LockOutcome::WouldBlock {
            return Err(ScanError::lock_failed(oid, "lock wait aborted"));
        }

        // The page may have changed while we waited; read the row again,
        // this time as a copy.
        let lsa = env.heap().page_lsa(oid)?;
        if lsa != snapshot.lsa {
            let old = snapshot.lsa.to_string();
            let new = lsa.to_string();
            let oid_field = oid.to_string();
            log_event(
                Event::PageVersionRetry,
                &[("oid", oid_field.as_str()), ("from", old.as_str()), ("to", new.as_str())],
            );

            stats.fetches += 1;
            let get = env.heap().get_visible_version(oid, class_oid, FetchMode::Copy)?;
            match visible(get)? {
                Some(record) => snapshot = record,
                None => return Ok(Locked::Skip),
            }
            if !env.reevaluator().reevaluate(filters, &snapshot, values, vd)? {
                return Ok(Locked::Skip);
            }
        }
    }

    let Some(latest) = visible(env.heap().get_last_version(oid, class_oid)?)? else {
        return Ok(Locked::Skip);
    };
    if latest.version == snapshot.version {
        return Ok(Locked::Row(latest));
    }
    if env.reevaluator().reevaluate(filters, &latest, values, vd)? {
        Ok(Locked::Row(latest))
    } else {
        Ok(Locked::Skip)
    }
}
