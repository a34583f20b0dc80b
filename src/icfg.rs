//! Interprocedural control-flow graph capability.
//!
//! The solver never inspects program structure itself; every structural question goes
//! through an [`Icfg`]. Queries return owned vectors, empty when there is nothing to report
//! (no callees, declaration-only function, ...). None of these cases is an error.

use std::fmt::Debug;
use std::hash::Hash;

pub trait Icfg {
    /// A program point.
    type Node: Clone + Eq + Hash + Debug;
    /// A procedure.
    type Function: Clone + Eq + Hash + Debug;

    /// Intraprocedural successors. For a call site these are its return sites.
    fn succs_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Intraprocedural predecessors.
    fn preds_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn is_call_site(&self, node: &Self::Node) -> bool;

    /// Possible callees of a call site. Empty if unresolved.
    fn callees_of_call_at(&self, node: &Self::Node) -> Vec<Self::Function>;

    fn return_sites_of_call_at(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Entry nodes of a function. Empty for declarations.
    fn start_points_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    /// Exit nodes of a function. Empty for declarations.
    fn exit_points_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    fn is_exit_inst(&self, node: &Self::Node) -> bool;

    fn is_start_point(&self, node: &Self::Node) -> bool;

    fn function_of(&self, node: &Self::Node) -> Self::Function;

    /// Call sites that may call `function`.
    fn callers_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    fn num_call_sites(&self) -> usize;

    fn all_functions(&self) -> Vec<Self::Function>;

    /// All nodes of a function, in a stable order.
    fn all_nodes_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    /// All call sites inside a function.
    fn calls_from_within(&self, function: &Self::Function) -> Vec<Self::Node>;
}
