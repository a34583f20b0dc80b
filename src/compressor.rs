//! Flyweight interning of domain values.
//!
//! A compressor maps every distinct value to a dense id, assigned in first-seen order,
//! and back. The solver keeps one compressor per id space (nodes, facts, functions) plus
//! a value compressor chosen by type parameter.
//!
//! Three flavours are provided:
//!
//! - [`Compressor`]: value-keyed map plus a vector of values. Good for cheap-to-clone keys.
//! - [`BoxedCompressor`]: canonical copies live behind [`Rc`], so each value is stored once
//!   no matter how large it is. Hashing and equality go through the value, never the address.
//! - [`NoneCompressor`]: no table at all; a value is its own id.
//!
//! # Invariants
//!
//! - `c[c.get_or_insert(v)] == v` for every `v`.
//! - `v1 == v2` implies `c.get_or_insert(v1) == c.get_or_insert(v2)`.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Index;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Bidirectional mapping between values and ids.
pub trait Compress<T> {
    /// The id type handed out by this compressor.
    type Id: Clone + Eq + Hash + Debug;

    /// Returns the id of `value`, interning it first if it is new.
    fn get_or_insert(&mut self, value: T) -> Self::Id;

    /// Returns the id of `value` if it was interned before.
    fn get_or_null(&self, value: &T) -> Option<Self::Id>;

    /// Returns the value behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this compressor.
    fn get<'a>(&'a self, id: &'a Self::Id) -> &'a T;

    /// Number of interned values.
    fn size(&self) -> usize;

    /// Number of values the compressor can hold without reallocating.
    fn capacity(&self) -> usize;
}

/// Value-keyed compressor handing out `u32` ids.
#[derive(Debug, Clone)]
pub struct Compressor<T> {
    index: FxHashMap<T, u32>,
    values: Vec<T>,
}

impl<T> Default for Compressor<T> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            values: Vec::new(),
        }
    }
}

impl<T> Compressor<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
        self.values.reserve(additional);
    }

    /// Iterates over `(id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.values.iter().enumerate().map(|(i, v)| (i as u32, v))
    }
}

impl<T> Index<u32> for Compressor<T> {
    type Output = T;

    fn index(&self, id: u32) -> &T {
        assert!(
            (id as usize) < self.values.len(),
            "Id {} out of range (size {})",
            id,
            self.values.len()
        );
        &self.values[id as usize]
    }
}

impl<T> Compress<T> for Compressor<T>
where
    T: Clone + Eq + Hash,
{
    type Id = u32;

    fn get_or_insert(&mut self, value: T) -> u32 {
        if let Some(&id) = self.index.get(&value) {
            return id;
        }
        assert!(self.values.len() < u32::MAX as usize, "Compressor id space exhausted");
        let id = self.values.len() as u32;
        self.values.push(value.clone());
        self.index.insert(value, id);
        id
    }

    fn get_or_null(&self, value: &T) -> Option<u32> {
        self.index.get(value).copied()
    }

    fn get<'a>(&'a self, id: &'a u32) -> &'a T {
        &self[*id]
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.values.capacity()
    }
}

/// Compressor keeping a single canonical copy of every value in a stable `Rc` arena.
#[derive(Debug, Clone)]
pub struct BoxedCompressor<T> {
    index: FxHashMap<Rc<T>, u32>,
    values: Vec<Rc<T>>,
}

impl<T> Default for BoxedCompressor<T> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            values: Vec::new(),
        }
    }
}

impl<T> BoxedCompressor<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
        self.values.reserve(additional);
    }

    /// Returns a shared handle to the canonical copy behind `id`.
    pub fn shared(&self, id: u32) -> Rc<T> {
        Rc::clone(&self.values[id as usize])
    }

    /// Iterates over `(id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.values.iter().enumerate().map(|(i, v)| (i as u32, v.as_ref()))
    }
}

impl<T> Index<u32> for BoxedCompressor<T> {
    type Output = T;

    fn index(&self, id: u32) -> &T {
        assert!(
            (id as usize) < self.values.len(),
            "Id {} out of range (size {})",
            id,
            self.values.len()
        );
        &self.values[id as usize]
    }
}

impl<T> Compress<T> for BoxedCompressor<T>
where
    T: Eq + Hash,
{
    type Id = u32;

    fn get_or_insert(&mut self, value: T) -> u32 {
        if let Some(&id) = self.index.get(&value) {
            return id;
        }
        assert!(self.values.len() < u32::MAX as usize, "Compressor id space exhausted");
        let id = self.values.len() as u32;
        let canonical = Rc::new(value);
        self.values.push(Rc::clone(&canonical));
        self.index.insert(canonical, id);
        id
    }

    fn get_or_null(&self, value: &T) -> Option<u32> {
        self.index.get(value).copied()
    }

    fn get<'a>(&'a self, id: &'a u32) -> &'a T {
        &self[*id]
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.values.capacity()
    }
}

/// Identity "compressor": the value is its own id and nothing is stored.
pub struct NoneCompressor<T>(PhantomData<fn() -> T>);

impl<T> Default for NoneCompressor<T> {
    fn default() -> Self {
        NoneCompressor(PhantomData)
    }
}

impl<T> Debug for NoneCompressor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NoneCompressor")
    }
}

impl<T> Compress<T> for NoneCompressor<T>
where
    T: Clone + Eq + Hash + Debug,
{
    type Id = T;

    fn get_or_insert(&mut self, value: T) -> T {
        value
    }

    fn get_or_null(&self, value: &T) -> Option<T> {
        Some(value.clone())
    }

    fn get<'a>(&'a self, id: &'a T) -> &'a T {
        id
    }

    fn size(&self) -> usize {
        0
    }

    fn capacity(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let mut c = Compressor::new();
        assert_eq!(c.get_or_insert("zero"), 0);
        assert_eq!(c.get_or_insert("one"), 1);
        assert_eq!(c.get_or_insert("zero"), 0);
        assert_eq!(c.size(), 2);
        assert_eq!(c[1], "one");
        assert_eq!(c.get_or_null(&"two"), None);
        assert_eq!(c.get_or_null(&"one"), Some(1));
    }

    #[test]
    fn test_boxed_stores_one_copy() {
        let mut c = BoxedCompressor::new();
        let a = c.get_or_insert(vec![1, 2, 3]);
        let b = c.get_or_insert(vec![1, 2, 3]);
        assert_eq!(a, b);
        // One handle in the index, one in the id vector, one here.
        assert_eq!(Rc::strong_count(&c.shared(a)), 3);
        assert_eq!(c.get(&a), &vec![1, 2, 3]);
        assert_eq!(c.iter().count(), 1);
    }

    #[test]
    fn test_none_compressor() {
        let mut c: NoneCompressor<String> = NoneCompressor::default();
        let id = c.get_or_insert("x".to_string());
        assert_eq!(c.get(&id), "x");
        assert_eq!(c.get_or_null(&"y".to_string()), Some("y".to_string()));
        assert_eq!(c.size(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range() {
        let c: Compressor<u8> = Compressor::new();
        let _ = &c[3];
    }
}
