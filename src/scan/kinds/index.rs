//! Index scans
//!
//! The driver fills a batch of results; this kind walks the batch, fetches
//! each object from the heap (unless the index covers the output) and runs
//! the data filter. Grouped scans treat each batch as one block and can
//! walk it in either direction.

use std::sync::Arc;

use crate::collab::{BtreeIndex, FetchMode, HeapGet, ReevalFilters, ScanEnv};
use crate::filter::{AttrCache, FilterInfo};
use crate::index::IndexScanDriver;
use crate::observability::{log_event, Event};
use crate::plan::IndexAccess;
use crate::scan::cursor::CursorCore;
use crate::scan::errors::{ScanError, ScanResult};
use crate::scan::mvcc::{lock_and_reevaluate, Locked};
use crate::scan::state::{ScanCode, ScanDirection, ScanPosition};
use crate::value::{DbValue, Oid};

use super::LeafScan;

pub(crate) struct IndexScan {
    driver: IndexScanDriver,
    /// Position in the current batch.
    curr_oidno: Option<usize>,
    /// Grouped scans: no block fetched since the scan started.
    first_block: bool,
    data_cache: AttrCache,
}

impl IndexScan {
    pub(crate) fn open(
        env: &ScanEnv,
        access: Arc<IndexAccess>,
        index: Arc<dyn BtreeIndex>,
    ) -> ScanResult<Self> {
        Ok(Self {
            driver: IndexScanDriver::open(env, access, index)?,
            curr_oidno: None,
            first_block: true,
            data_cache: AttrCache::default(),
        })
    }

    pub(crate) fn driver(&self) -> &IndexScanDriver {
        &self.driver
    }

    /// Next batch slot of an ungrouped scan, fetching batches as needed.
    fn step(&mut self, core: &mut CursorCore) -> ScanResult<Option<usize>> {
        match core.position {
            ScanPosition::Before => {
                let code = self.driver.next_oidset(
                    &core.env,
                    &core.values,
                    &core.vd,
                    &mut core.stats,
                    true,
                )?;
                if code == ScanCode::End {
                    return Ok(None);
                }
                core.position = ScanPosition::On;
                self.curr_oidno = Some(0);
            }
            ScanPosition::On => {
                let next = self.curr_oidno.map_or(0, |n| n + 1);
                if next < self.driver.result_count() {
                    self.curr_oidno = Some(next);
                } else {
                    if self.driver.batch_was_last() {
                        return Ok(None);
                    }
                    let advance = self.driver.should_advance_iss();
                    let code = self.driver.next_oidset(
                        &core.env,
                        &core.values,
                        &core.vd,
                        &mut core.stats,
                        advance,
                    )?;
                    if code == ScanCode::End {
                        return Ok(None);
                    }
                    self.curr_oidno = Some(0);
                }
            }
            ScanPosition::After => return Ok(None),
        }
        Ok(self.curr_oidno)
    }

    /// Next slot of the current block of a grouped scan.
    fn step_grouped(&mut self, direction: ScanDirection) -> Option<usize> {
        let count = self.driver.result_count();
        let next = match (direction, self.curr_oidno) {
            (ScanDirection::Forward, None) => 0,
            (ScanDirection::Forward, Some(n)) => n + 1,
            (ScanDirection::Backward, None) => count.checked_sub(1)?,
            (ScanDirection::Backward, Some(n)) => n.checked_sub(1)?,
        };
        if next >= count {
            return None;
        }
        self.curr_oidno = Some(next);
        Some(next)
    }

    /// Produce the row for one batch result. `false` skips it.
    fn emit(&mut self, core: &mut CursorCore, oid: Oid, key: Option<DbValue>) -> ScanResult<bool> {
        let access = self.driver.access();
        let info = self.driver.index().info();
        let class_oid = access.class_oid;
        let data = FilterInfo::new(&access.data_pred, &access.data_attrs, class_oid);

        if let Some(columns) = &access.covering {
            let key = key.ok_or_else(ScanError::unknown_position)?;
            let data = data.for_index(&info.attr_ids, &info.vstr_columns);
            let ev = data.eval_key(&mut self.data_cache, &key, &core.values, &core.vd)?;
            if !core.admit(ev) {
                return Ok(false);
            }
            let row = columns
                .iter()
                .map(|col| key.column(*col).cloned().unwrap_or_default())
                .collect();
            core.set_row(row)?;
            core.stats.qualified_rows += 1;
            return Ok(true);
        }

        core.stats.fetches += 1;
        let record = match core.env.heap().get_visible_version(oid, class_oid, FetchMode::Peek)? {
            HeapGet::Visible(record) => record,
            HeapGet::SnapshotNotSatisfied | HeapGet::DoesntExist => return Ok(false),
            HeapGet::Corrupt(reason) => {
                let oid_field = oid.to_string();
                log_event(
                    Event::InconsistentIndexEntry,
                    &[
                        ("index", info.name.as_str()),
                        ("oid", oid_field.as_str()),
                        ("reason", reason.as_str()),
                    ],
                );
                return Err(ScanError::inconsistent_index(
                    oid,
                    format!("index {} points to an invalid object: {}", info.name, reason),
                ));
            }
        };

        let ev = data.eval_record(
            &mut self.data_cache,
            Some(oid),
            &record.attrs,
            &core.values,
            &core.vd,
        )?;
        if !core.admit(ev) {
            return Ok(false);
        }

        let key_stage = FilterInfo::new(&access.key_pred, &access.key_attrs, class_oid)
            .for_index(&info.attr_ids, &info.vstr_columns);
        if core.env.config().oracle_style_empty_string && key_stage.has_empty_vstr(&record.attrs) {
            return Ok(false);
        }

        let record = if core.op.locks_rows() {
            let range_stage = FilterInfo::new(&access.range_pred, &access.range_attrs, class_oid);
            let filters = ReevalFilters {
                range: (!range_stage.is_empty()).then_some(range_stage),
                key: (!key_stage.is_empty()).then_some(key_stage),
                data: Some(data),
            };
            match lock_and_reevaluate(
                &core.env,
                record,
                class_oid,
                &filters,
                &core.values,
                &core.vd,
                &mut core.stats,
            )? {
                Locked::Row(record) => record,
                Locked::Skip => return Ok(false),
            }
        } else {
            record
        };

        core.fill_from(&access.rest_attrs.attr_ids, &record.attrs);
        core.stats.qualified_rows += 1;
        Ok(true)
    }
}

impl LeafScan for IndexScan {
    fn start(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.curr_oidno = None;
        self.first_block = true;
        self.driver
            .start(&core.env, &core.vd, core.grouped, &mut core.stats)
    }

    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        loop {
            let slot = if core.grouped {
                self.step_grouped(core.direction)
            } else {
                self.step(core)?
            };
            let Some(slot) = slot else {
                return Ok(ScanCode::End);
            };

            let (oid, key) = match self.driver.result_at(slot) {
                Some(hit) => (hit.oid, hit.key.cloned()),
                None => return Err(ScanError::unknown_position()),
            };
            core.stats.read_rows += 1;
            if self.emit(core, oid, key)? {
                return Ok(ScanCode::Success);
            }
        }
    }

    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        self.curr_oidno = None;
        if core.grouped {
            // OID-ordered batches are walked in alternating directions.
            core.direction = if core.is_forward() && core.env.config().index_scan_in_oid_order {
                ScanDirection::Backward
            } else {
                ScanDirection::Forward
            };
            return Ok(());
        }
        core.position = ScanPosition::Before;
        self.driver
            .start(&core.env, &core.vd, core.grouped, &mut core.stats)
    }

    fn next_block(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        if !core.grouped {
            return Ok(if core.position == ScanPosition::Before {
                ScanCode::Success
            } else {
                ScanCode::End
            });
        }

        let first = self.first_block;
        if !first && self.driver.batch_was_last() {
            core.position = ScanPosition::After;
            return Ok(ScanCode::End);
        }

        let advance = !first && self.driver.should_advance_iss();
        self.first_block = false;
        let code = self.driver.next_oidset(
            &core.env,
            &core.values,
            &core.vd,
            &mut core.stats,
            advance,
        )?;
        if code == ScanCode::End {
            core.position = ScanPosition::After;
            return Ok(ScanCode::End);
        }

        core.position = ScanPosition::On;
        self.curr_oidno = None;
        core.direction = if core.env.config().index_scan_in_oid_order {
            ScanDirection::Backward
        } else {
            ScanDirection::Forward
        };
        Ok(ScanCode::Success)
    }

    fn end(&mut self, _core: &mut CursorCore) {
        self.curr_oidno = None;
        self.driver.end();
    }

    fn close(&mut self) {
        self.driver.release();
    }
}
