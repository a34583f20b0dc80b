//! Client-facing edge functions.
//!
//! A client problem describes the edge function of one exploded-supergraph edge as an
//! [`EdgeFunction`] value. The solver immediately interns it into the
//! [`EdgeFunctions`][crate::edge_functions::EdgeFunctions] manager and from then on only
//! deals with [`EdgeRef`][crate::edge_functions::EdgeRef] handles. Composition and join are
//! performed by the manager; clients only contribute leaves.
//!
//! Analyses whose transformers are not covered by the built-in variants plug in their own
//! payload type through [`CustomEdgeFunction`]. Analyses that need nothing beyond the
//! built-ins use [`NoCustom`].

use std::fmt::Debug;
use std::hash::Hash;

use crate::lattice::JoinLattice;

/// An edge function as produced by a client problem.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EdgeFunction<L, K> {
    /// `λv. v`
    Identity,
    /// `λv. top`, the function of unreached edges.
    AllTop,
    /// `λv. bottom`
    AllBottom,
    /// `λv. c`
    Constant(L),
    /// A client-defined transformer.
    Custom(K),
}

/// Payload of a client-defined edge function.
///
/// Values are compared structurally: the manager shares one handle between equal payloads
/// (unless [`is_cacheable`][CustomEdgeFunction::is_cacheable] opts out).
pub trait CustomEdgeFunction<L>: Clone + Eq + Hash + Debug {
    /// Applies the function to `source`.
    fn compute_target(&self, source: &L) -> L;

    /// Folds `self` followed by `second` into a single payload, if the client can.
    ///
    /// Returning `None` makes the manager build a generic composition node.
    fn compose(&self, _second: &Self) -> Option<Self> {
        None
    }

    /// Folds the pointwise join of `self` and `other` into a single payload, if the client can.
    fn join(&self, _other: &Self) -> Option<Self> {
        None
    }

    /// Returns the result if the function ignores its input.
    fn as_constant(&self) -> Option<L> {
        None
    }

    /// Whether structurally equal payloads may share one handle.
    ///
    /// Payloads that are cheap to rebuild and whose instances are logically distinct can
    /// return `false` to bypass the hash-consing table.
    fn is_cacheable(&self) -> bool {
        true
    }
}

/// Uninhabited payload for problems that only use the built-in edge functions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum NoCustom {}

impl<L: JoinLattice> CustomEdgeFunction<L> for NoCustom {
    fn compute_target(&self, _source: &L) -> L {
        match *self {}
    }
}

impl<L, K> EdgeFunction<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    /// Evaluates the function directly, without going through the manager.
    pub fn compute_target(&self, source: &L) -> L {
        match self {
            EdgeFunction::Identity => source.clone(),
            EdgeFunction::AllTop => L::top(),
            EdgeFunction::AllBottom => L::bottom(),
            EdgeFunction::Constant(c) => c.clone(),
            EdgeFunction::Custom(k) => k.compute_target(source),
        }
    }

    /// Returns the result if the function ignores its input.
    pub fn as_constant(&self) -> Option<L> {
        match self {
            EdgeFunction::Identity => None,
            EdgeFunction::AllTop => Some(L::top()),
            EdgeFunction::AllBottom => Some(L::bottom()),
            EdgeFunction::Constant(c) => Some(c.clone()),
            EdgeFunction::Custom(k) => k.as_constant(),
        }
    }
}
