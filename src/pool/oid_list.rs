//! Fixed-capacity OID buffer

use crate::value::Oid;

use super::errors::{PoolError, PoolResult};

/// A buffer of object identifiers.
///
/// Capacity is fixed when the buffer is allocated and never grows; a scan
/// that finds more OIDs than fit drains the buffer and refills it.
#[derive(Debug)]
pub struct OidList {
    id: u64,
    oids: Vec<Oid>,
    capacity: usize,
}

impl OidList {
    /// Allocate a buffer, reporting allocation failure instead of aborting.
    pub(crate) fn try_new(id: u64, capacity: usize) -> PoolResult<Self> {
        let mut oids = Vec::new();
        oids.try_reserve_exact(capacity)
            .map_err(|_| PoolError::out_of_memory(capacity))?;
        Ok(Self { id, oids, capacity })
    }

    /// A zero-capacity list that owns no allocation.
    pub(crate) fn detached() -> Self {
        Self {
            id: 0,
            oids: Vec::new(),
            capacity: 0,
        }
    }

    /// Identity of the underlying allocation, stable across reuse.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.oids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.oids.len() >= self.capacity
    }

    /// Append an OID. Returns `false` when the buffer is already full.
    pub fn push(&mut self, oid: Oid) -> bool {
        if self.is_full() {
            return false;
        }
        self.oids.push(oid);
        true
    }

    pub fn get(&self, idx: usize) -> Option<Oid> {
        self.oids.get(idx).copied()
    }

    pub fn as_slice(&self) -> &[Oid] {
        &self.oids
    }

    pub fn clear(&mut self) {
        self.oids.clear();
    }

    /// Sort by physical location.
    pub fn sort(&mut self) {
        self.oids.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut list = OidList::try_new(1, 2).unwrap();
        assert!(list.push(Oid::new(0, 1, 1)));
        assert!(list.push(Oid::new(0, 1, 2)));
        assert!(list.is_full());
        assert!(!list.push(Oid::new(0, 1, 3)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_capacity_survives_clear() {
        let mut list = OidList::try_new(7, 4).unwrap();
        list.push(Oid::new(0, 0, 0));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 4);
        assert_eq!(list.id(), 7);
    }

    #[test]
    fn test_sort_physical_order() {
        let mut list = OidList::try_new(1, 8).unwrap();
        list.push(Oid::new(0, 9, 1));
        list.push(Oid::new(0, 2, 5));
        list.push(Oid::new(0, 2, 1));
        list.sort();
        assert_eq!(
            list.as_slice(),
            &[Oid::new(0, 2, 1), Oid::new(0, 2, 5), Oid::new(0, 9, 1)]
        );
    }
}
