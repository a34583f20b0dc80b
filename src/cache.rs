//! Memo tables with hit/miss accounting.
//!
//! [`Cache`] backs the compose/join memo tables of the edge-function manager and the
//! flow/edge-function caches of the solver. Entries are never evicted implicitly; owners
//! call [`Cache::clear`] when the cached handles may have become stale (for example after
//! an edge-function garbage collection).

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A memo table backed by [`FxHashMap`].
pub struct Cache<K, V> {
    map: FxHashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    /// Creates a cache with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drops all entries. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over the cached values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
{
    /// Looks up a key, counting a hit or a miss.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.map.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Inserts a value, replacing any previous entry for `key`.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        if self.map.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.map.entry(key).or_insert_with(compute)
    }
}
