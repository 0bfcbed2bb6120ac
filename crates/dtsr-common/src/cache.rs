//! Bounded insertion-ordered cache.
//!
//! Both process-wide caches (substring finders, parsed import items) must
//! stay bounded: inserting past capacity evicts the oldest entry. Lookups
//! do not refresh entry age; eviction is strictly FIFO.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;

pub struct BoundedCache<K, V> {
    map: IndexMap<K, V, FxBuildHasher>,
    capacity: usize,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        BoundedCache {
            map: IndexMap::with_capacity_and_hasher(capacity.min(64), FxBuildHasher),
            capacity,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.map.shift_remove_index(0);
        }
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
