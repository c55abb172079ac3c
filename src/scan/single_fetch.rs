//! Join-level single-fetch handling
//!
//! Wraps one step of the leaf scan:
//!
//! - `SingleOuter` returns at most one row, padding with a NULL row when
//!   nothing qualifies
//! - `SingleInner` returns at most one row and nothing otherwise
//! - `NoSingleOuter` returns every row, or a single NULL row when nothing
//!   qualifies

use super::cursor::{ScanCursor, Step};
use super::errors::ScanResult;
use super::state::{ScanCode, SingleFetch};

impl ScanCursor {
    fn join_value_is_null(&self) -> ScanResult<bool> {
        let Some(expr) = &self.core.join_value else {
            return Ok(false);
        };
        let value = self.core.env.fetch().peek(expr, &self.core.vd)?;
        Ok(value.is_null())
    }

    pub(crate) fn handle_single_scan(&mut self, step: Step) -> ScanResult<ScanCode> {
        match self.core.single_fetch {
            SingleFetch::NoSingleInner => self.step_local(step),

            SingleFetch::SingleOuter => {
                if self.core.single_fetched {
                    return Ok(ScanCode::End);
                }
                if !self.join_value_is_null()? {
                    if self.step_local(step)? == ScanCode::End {
                        self.core.set_null_row();
                    }
                } else {
                    self.core.set_null_row();
                }
                self.core.single_fetched = true;
                Ok(ScanCode::Success)
            }

            SingleFetch::SingleInner => {
                if self.core.single_fetched || self.join_value_is_null()? {
                    return Ok(ScanCode::End);
                }
                let code = self.step_local(step)?;
                if code == ScanCode::Success {
                    self.core.single_fetched = true;
                }
                Ok(code)
            }

            SingleFetch::NoSingleOuter => {
                if self.core.null_fetched {
                    return Ok(ScanCode::End);
                }
                match self.step_local(step)? {
                    ScanCode::Success => {
                        self.core.single_fetched = true;
                        Ok(ScanCode::Success)
                    }
                    ScanCode::End if !self.core.single_fetched => {
                        self.core.set_null_row();
                        self.core.null_fetched = true;
                        Ok(ScanCode::Success)
                    }
                    ScanCode::End => Ok(ScanCode::End),
                }
            }
        }
    }
}
