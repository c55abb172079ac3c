//! Attribute cache shared by one filter stage

use std::collections::BTreeMap;

use crate::value::DbValue;

/// Attribute identifier; doubles as the index into a record's attributes.
pub type AttrId = usize;

/// Attribute values of the current candidate, loaded on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrCache {
    values: BTreeMap<AttrId, DbValue>,
}

impl AttrCache {
    pub fn get(&self, id: AttrId) -> Option<&DbValue> {
        self.values.get(&id)
    }

    pub fn insert(&mut self, id: AttrId, value: DbValue) {
        self.values.insert(id, value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the cache with `ids` read from a heap record.
    ///
    /// Attributes the record does not have read as NULL.
    pub fn load_record(&mut self, ids: &[AttrId], record: &[DbValue]) {
        self.values.clear();
        for &id in ids {
            let value = record.get(id).cloned().unwrap_or_default();
            self.values.insert(id, value);
        }
    }

    /// Replace the cache with `ids` read from an index key whose column `i`
    /// stores attribute `btree_attr_ids[i]`.
    pub fn load_key(&mut self, ids: &[AttrId], btree_attr_ids: &[AttrId], key: &DbValue) {
        self.values.clear();
        for (col, &attr) in btree_attr_ids.iter().enumerate() {
            if !ids.contains(&attr) {
                continue;
            }
            let value = key.column(col).cloned().unwrap_or_default();
            self.values.insert(attr, value);
        }
    }
}
