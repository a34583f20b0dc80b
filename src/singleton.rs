//! Canonicalization tables for interned values.
//!
//! A [`SingletonCache`] maps a structural value to the one handle that represents it.
//! [`KindCaches`] keeps one such table per kind of value. The tables are owned by whoever
//! interns (the edge-function manager of a solver instance), never global, so independent
//! solvers never observe each other's handles.
//!
//! Values whose kind is `None` bypass the tables entirely: every instance gets a handle of
//! its own.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Exposes the kind tag that selects a value's canonicalization table.
pub trait HasKind {
    type Kind: Copy + Eq + Hash;

    /// Returns the kind tag, or `None` if the value must not be canonicalized.
    fn kind(&self) -> Option<Self::Kind>;
}

/// Structural value to canonical handle.
#[derive(Debug, Clone)]
pub struct SingletonCache<T, H> {
    map: FxHashMap<T, H>,
}

impl<T, H> Default for SingletonCache<T, H> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }
}

impl<T, H> SingletonCache<T, H>
where
    T: Eq + Hash,
    H: Copy,
{
    pub fn lookup(&self, value: &T) -> Option<H> {
        self.map.get(value).copied()
    }

    pub fn insert(&mut self, value: T, handle: H) {
        self.map.insert(value, handle);
    }

    pub fn erase(&mut self, value: &T) -> Option<H> {
        self.map.remove(value)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One [`SingletonCache`] per kind tag.
#[derive(Debug, Clone)]
pub struct KindCaches<T: HasKind, H> {
    caches: FxHashMap<T::Kind, SingletonCache<T, H>>,
}

impl<T: HasKind, H> Default for KindCaches<T, H> {
    fn default() -> Self {
        Self {
            caches: FxHashMap::default(),
        }
    }
}

impl<T, H> KindCaches<T, H>
where
    T: HasKind + Eq + Hash,
    H: Copy,
{
    pub fn lookup(&self, value: &T) -> Option<H> {
        let kind = value.kind()?;
        self.caches.get(&kind)?.lookup(value)
    }

    /// Registers `handle` as canonical for `value`. Returns false if the value's kind is not cached.
    pub fn insert(&mut self, value: T, handle: H) -> bool {
        match value.kind() {
            Some(kind) => {
                self.caches.entry(kind).or_default().insert(value, handle);
                true
            }
            None => false,
        }
    }

    pub fn erase(&mut self, value: &T) -> Option<H> {
        let kind = value.kind()?;
        self.caches.get_mut(&kind)?.erase(value)
    }

    /// Number of canonical entries of the given kind.
    pub fn len_of(&self, kind: T::Kind) -> usize {
        self.caches.get(&kind).map_or(0, |c| c.len())
    }

    /// Total number of canonical entries.
    pub fn len(&self) -> usize {
        self.caches.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Eq, PartialEq, Hash)]
    enum Shape {
        Square(u32),
        Circle(u32),
        Scratch(u32),
    }

    impl HasKind for Shape {
        type Kind = u8;

        fn kind(&self) -> Option<u8> {
            match self {
                Shape::Square(_) => Some(0),
                Shape::Circle(_) => Some(1),
                Shape::Scratch(_) => None,
            }
        }
    }

    #[test]
    fn test_singleton_cache() {
        let mut cache: SingletonCache<&str, u32> = SingletonCache::default();
        assert_eq!(cache.lookup(&"a"), None);
        cache.insert("a", 7);
        assert_eq!(cache.lookup(&"a"), Some(7));
        assert_eq!(cache.erase(&"a"), Some(7));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_kind_caches_separate_kinds() {
        let mut caches: KindCaches<Shape, u32> = KindCaches::default();
        assert!(caches.insert(Shape::Square(1), 10));
        assert!(caches.insert(Shape::Circle(1), 11));
        assert_eq!(caches.lookup(&Shape::Square(1)), Some(10));
        assert_eq!(caches.lookup(&Shape::Circle(1)), Some(11));
        assert_eq!(caches.len_of(0), 1);
        assert_eq!(caches.len(), 2);
    }

    #[test]
    fn test_uncached_kind_bypasses() {
        let mut caches: KindCaches<Shape, u32> = KindCaches::default();
        assert!(!caches.insert(Shape::Scratch(1), 5));
        assert_eq!(caches.lookup(&Shape::Scratch(1)), None);
        assert_eq!(caches.erase(&Shape::Scratch(1)), None);
        assert!(caches.is_empty());
    }
}
