//! Class attribute scans: the single row of values stored for a class

use crate::filter::{AttrCache, FilterInfo};
use crate::plan::ClassAttrAccess;
use crate::scan::cursor::CursorCore;
use crate::scan::errors::ScanResult;
use crate::scan::state::{ScanCode, ScanPosition};

use super::LeafScan;

pub(crate) struct ClassAttrScan {
    access: ClassAttrAccess,
    cache: AttrCache,
}

impl ClassAttrScan {
    pub(crate) fn new(access: ClassAttrAccess) -> Self {
        Self {
            access,
            cache: AttrCache::default(),
        }
    }
}

impl LeafScan for ClassAttrScan {
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        if core.position != ScanPosition::Before {
            return Ok(ScanCode::End);
        }
        // Past the only row whatever the outcome.
        core.position = ScanPosition::On;

        let class_oid = self.access.class_oid;
        let Some(attrs) = core.env.heap().class_attributes(class_oid)? else {
            return Ok(ScanCode::End);
        };
        core.stats.fetches += 1;
        core.stats.read_rows += 1;

        let filter = FilterInfo::new(&self.access.pred, &self.access.pred_attrs, class_oid);
        let ev = filter.eval_record(&mut self.cache, Some(class_oid), &attrs, &core.values, &core.vd)?;
        if !core.admit(ev) {
            return Ok(ScanCode::End);
        }

        core.fill_from(&self.access.rest_attrs.attr_ids, &attrs);
        core.stats.qualified_rows += 1;
        Ok(ScanCode::Success)
    }
}
