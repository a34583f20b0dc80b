//! Dense integer identities for nodes, facts and functions.
//!
//! The solver never stores client values in its hot tables. Every node, fact and
//! function is interned once through a [`Compressor`][crate::compressor::Compressor]
//! and referred to by one of the newtypes below afterwards. The wrappers keep the
//! three id spaces apart at compile time.
use std::fmt;

/// Identity of a program point (instruction or statement).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

/// Identity of a data-flow fact.
///
/// # Invariants
///
/// - [`FactId::ZERO`] always denotes the problem's zero fact.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FactId(u32);

/// Identity of a procedure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FunctionId(u32);

macro_rules! dense_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Creates an id from its raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index.
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Returns the raw index as `usize`, for indexing dense tables.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }
    };
}

dense_id!(NodeId, "n");
dense_id!(FactId, "d");
dense_id!(FunctionId, "f");

impl FactId {
    /// The zero (tautological) fact. The solver interns the zero fact first, so
    /// it always receives this id.
    pub const ZERO: FactId = FactId(0);

    /// Checks if this is the zero fact.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Packs two 32-bit ids into one 64-bit key, `lhs` in the high half.
pub const fn combine_ids(lhs: u32, rhs: u32) -> u64 {
    ((lhs as u64) << 32) | rhs as u64
}

/// Inverse of [`combine_ids`].
pub const fn split_ids(key: u64) -> (u32, u32) {
    ((key >> 32) as u32, (key & u32::MAX as u64) as u32)
}

/// Key of a jump function inside one node's table: `(source fact, target fact)`.
pub fn fact_pair(source: FactId, target: FactId) -> u64 {
    combine_ids(source.get(), target.get())
}

/// Inverse of [`fact_pair`].
pub fn split_fact_pair(key: u64) -> (FactId, FactId) {
    let (source, target) = split_ids(key);
    (FactId(source), FactId(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fact() {
        assert!(FactId::ZERO.is_zero());
        assert!(!FactId::new(1).is_zero());
        assert_eq!(FactId::ZERO.get(), 0);
    }

    #[test]
    fn test_combine_split() {
        let key = combine_ids(7, 42);
        assert_eq!(split_ids(key), (7, 42));
        assert_eq!(split_ids(combine_ids(u32::MAX, 0)), (u32::MAX, 0));
        assert_eq!(split_ids(combine_ids(0, u32::MAX)), (0, u32::MAX));
        assert_ne!(combine_ids(1, 2), combine_ids(2, 1));
    }

    #[test]
    fn test_fact_pair() {
        let key = fact_pair(FactId::new(3), FactId::new(9));
        assert_eq!(split_fact_pair(key), (FactId::new(3), FactId::new(9)));
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId::new(4).to_string(), "n4");
        assert_eq!(FactId::ZERO.to_string(), "d0");
        assert_eq!(FunctionId::new(1).to_string(), "f1");
    }
}
