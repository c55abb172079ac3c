//! One filtering stage: range filter, key filter or data filter

use crate::plan::{ScanAttrs, ScanPred, ValDescr};
use crate::scan::ScanResult;
use crate::value::{DbValue, Oid};

use super::attr_cache::{AttrCache, AttrId};
use super::predicate::{Logical, RowContext};

/// A predicate together with what it needs to run.
///
/// Borrowed from the plan and the cursor; never owned.
#[derive(Debug, Clone, Copy)]
pub struct FilterInfo<'a> {
    pub pred: &'a ScanPred,
    pub attrs: &'a ScanAttrs,
    pub class_oid: Oid,
    /// Key and range filters only: column `i` of the index key stores
    /// attribute `btree_attr_ids[i]`.
    pub btree_attr_ids: &'a [AttrId],
    /// Key and range filters only: index columns holding variable strings.
    pub vstr_columns: &'a [usize],
}

impl<'a> FilterInfo<'a> {
    pub fn new(pred: &'a ScanPred, attrs: &'a ScanAttrs, class_oid: Oid) -> Self {
        Self {
            pred,
            attrs,
            class_oid,
            btree_attr_ids: &[],
            vstr_columns: &[],
        }
    }

    pub fn for_index(mut self, btree_attr_ids: &'a [AttrId], vstr_columns: &'a [usize]) -> Self {
        self.btree_attr_ids = btree_attr_ids;
        self.vstr_columns = vstr_columns;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pred.is_none()
    }

    fn run(
        &self,
        cache: &AttrCache,
        oid: Option<Oid>,
        values: &[DbValue],
        vd: &ValDescr,
    ) -> ScanResult<Logical> {
        let Some(pred) = self.pred.predicate() else {
            return Ok(Logical::True);
        };
        pred.eval(&RowContext {
            oid,
            class_oid: self.class_oid,
            attrs: cache,
            values,
            vd,
        })
    }

    /// Evaluate against a heap record.
    pub fn eval_record(
        &self,
        cache: &mut AttrCache,
        oid: Option<Oid>,
        record: &[DbValue],
        values: &[DbValue],
        vd: &ValDescr,
    ) -> ScanResult<Logical> {
        if self.is_empty() {
            return Ok(Logical::True);
        }
        cache.load_record(&self.attrs.attr_ids, record);
        self.run(cache, oid, values, vd)
    }

    /// Evaluate against an index key, before any heap access.
    pub fn eval_key(
        &self,
        cache: &mut AttrCache,
        key: &DbValue,
        values: &[DbValue],
        vd: &ValDescr,
    ) -> ScanResult<Logical> {
        if self.is_empty() {
            return Ok(Logical::True);
        }
        cache.load_key(&self.attrs.attr_ids, self.btree_attr_ids, key);
        self.run(cache, None, values, vd)
    }

    /// Evaluate a predicate over the value list alone.
    pub fn eval_values(&self, values: &[DbValue], vd: &ValDescr) -> ScanResult<Logical> {
        self.run(&AttrCache::default(), None, values, vd)
    }

    /// With empty strings stored as NULL, a record whose variable-string key
    /// column is NULL or empty cannot match the key it was found under.
    pub fn has_empty_vstr(&self, record: &[DbValue]) -> bool {
        self.vstr_columns.iter().any(|&col| {
            let Some(&attr) = self.btree_attr_ids.get(col) else {
                return false;
            };
            match record.get(attr) {
                None | Some(DbValue::Null) => true,
                Some(DbValue::String(s)) => s.is_empty(),
                Some(_) => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt_ten(row: &RowContext<'_>) -> ScanResult<Logical> {
        Ok(match row.attr(2) {
            DbValue::Null => Logical::Unknown,
            v => Logical::from(v.compare(&DbValue::Integer(10), Default::default())
                == Some(std::cmp::Ordering::Greater)),
        })
    }

    #[test]
    fn test_empty_filter_is_true() {
        let pred = ScanPred::none();
        let attrs = ScanAttrs::default();
        let info = FilterInfo::new(&pred, &attrs, Oid::NULL);
        let mut cache = AttrCache::default();
        let result = info
            .eval_record(&mut cache, None, &[], &[], &ValDescr::default())
            .unwrap();
        assert_eq!(result, Logical::True);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_record_filter() {
        let pred = ScanPred::new(gt_ten);
        let attrs = ScanAttrs::new(vec![2]);
        let info = FilterInfo::new(&pred, &attrs, Oid::NULL);
        let mut cache = AttrCache::default();
        let vd = ValDescr::default();

        let rec = [DbValue::Null, DbValue::Null, DbValue::Integer(11)];
        assert_eq!(info.eval_record(&mut cache, None, &rec, &[], &vd).unwrap(), Logical::True);

        let rec = [DbValue::Null, DbValue::Null, DbValue::Null];
        assert_eq!(info.eval_record(&mut cache, None, &rec, &[], &vd).unwrap(), Logical::Unknown);
    }

    #[test]
    fn test_key_filter_uses_index_columns() {
        let pred = ScanPred::new(gt_ten);
        let attrs = ScanAttrs::new(vec![2]);
        let bt_attrs = [5, 2];
        let info = FilterInfo::new(&pred, &attrs, Oid::NULL).for_index(&bt_attrs, &[]);
        let mut cache = AttrCache::default();

        let key = DbValue::Midxkey(vec![DbValue::Integer(0), DbValue::Integer(3)]);
        let result = info.eval_key(&mut cache, &key, &[], &ValDescr::default()).unwrap();
        assert_eq!(result, Logical::False);
    }

    #[test]
    fn test_empty_vstr_detection() {
        let pred = ScanPred::none();
        let attrs = ScanAttrs::default();
        let bt_attrs = [1, 0];
        let vstr = [1];
        let info = FilterInfo::new(&pred, &attrs, Oid::NULL).for_index(&bt_attrs, &vstr);

        assert!(info.has_empty_vstr(&[DbValue::string(""), DbValue::Integer(1)]));
        assert!(info.has_empty_vstr(&[DbValue::Null, DbValue::Integer(1)]));
        assert!(!info.has_empty_vstr(&[DbValue::string("a"), DbValue::Integer(1)]));
    }
}
