//! Value lattices.
//!
//! Orientation follows the usual IDE convention: `top` means "no information yet"
//! (unreached) and is the neutral element of `join`; `bottom` means "over-defined"
//! and absorbs everything.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// A join semi-lattice with explicit top and bottom elements.
///
/// # Contract
///
/// - `join` is commutative, associative and idempotent.
/// - `top().join(x) == x` and `bottom().join(x) == bottom()`.
/// - Ascending chains under `join` are finite, otherwise the solver may not terminate.
pub trait JoinLattice: Clone + Eq + Hash + Debug {
    fn top() -> Self;
    fn bottom() -> Self;
    fn join(&self, other: &Self) -> Self;

    fn is_top(&self) -> bool {
        *self == Self::top()
    }

    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }
}

/// Two-point lattice used when only reachability matters (IFDS).
///
/// `Bottom` marks a fact that holds, `Top` one that was never reached.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BinaryDomain {
    Bottom,
    Top,
}

impl JoinLattice for BinaryDomain {
    fn top() -> Self {
        BinaryDomain::Top
    }

    fn bottom() -> Self {
        BinaryDomain::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (BinaryDomain::Top, BinaryDomain::Top) => BinaryDomain::Top,
            _ => BinaryDomain::Bottom,
        }
    }
}

impl Display for BinaryDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryDomain::Bottom => write!(f, "BOTTOM"),
            BinaryDomain::Top => write!(f, "TOP"),
        }
    }
}

/// Flat lattice over `T`: `Top`, then every value side by side, then `Bottom`.
///
/// This is the value domain of constant propagation: two different constants join to `Bottom`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Flat<T> {
    Top,
    Value(T),
    Bottom,
}

impl<T> Flat<T> {
    /// Returns the inner value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Flat::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> JoinLattice for Flat<T>
where
    T: Clone + Eq + Hash + Debug,
{
    fn top() -> Self {
        Flat::Top
    }

    fn bottom() -> Self {
        Flat::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Flat::Top, x) | (x, Flat::Top) => x.clone(),
            (Flat::Bottom, _) | (_, Flat::Bottom) => Flat::Bottom,
            (Flat::Value(a), Flat::Value(b)) if a == b => Flat::Value(a.clone()),
            _ => Flat::Bottom,
        }
    }
}

impl<T: Display> Display for Flat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flat::Top => write!(f, "TOP"),
            Flat::Value(v) => write!(f, "{}", v),
            Flat::Bottom => write!(f, "BOTTOM"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_domain() {
        use BinaryDomain::*;
        assert_eq!(Top.join(&Top), Top);
        assert_eq!(Top.join(&Bottom), Bottom);
        assert_eq!(Bottom.join(&Top), Bottom);
        assert!(BinaryDomain::top().is_top());
        assert!(BinaryDomain::bottom().is_bottom());
    }

    #[test]
    fn test_flat_join() {
        let top: Flat<i64> = Flat::Top;
        let one = Flat::Value(1);
        let two = Flat::Value(2);
        assert_eq!(top.join(&one), one);
        assert_eq!(one.join(&top), one);
        assert_eq!(one.join(&one), one);
        assert_eq!(one.join(&two), Flat::Bottom);
        assert_eq!(Flat::Bottom.join(&one), Flat::Bottom);
        assert_eq!(one.value(), Some(&1));
        assert_eq!(format!("{}", two), "2");
    }
}
