//! Growable bit set over dense ids.
//!
//! Used by the jump-function garbage collector (candidate functions, reachability
//! marks) and by the edge-function manager during mark-and-sweep.

/// A bit set backed by a vector of `u64` words.
///
/// Setting a bit beyond the current capacity grows the set.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits, cached for O(1) `len()`.
    count: usize,
}

impl BitSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty bit set with room for `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the capacity in bits.
    pub fn capacity(&self) -> usize {
        self.words.len() * Self::BITS_PER_WORD
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    /// Returns true if the bit at `index` is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Sets the bit at `index`. Returns true if it was previously clear.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_clear = self.words[word] & mask == 0;
        if was_clear {
            self.words[word] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at `index`. Returns true if it was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let was_set = *w & mask != 0;
        if was_set {
            *w &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Clears all bits, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Iterates over the indices of all set bits in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::default();
        set.extend(iter);
        set
    }
}

/// Iterator over set bits of a [`BitSet`].
pub struct Iter<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * BitSet::BITS_PER_WORD + bit);
            }
            self.word_index += 1;
            self.current = *self.words.get(self.word_index)?;
        }
    }
}
