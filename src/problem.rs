//! Analysis problem capabilities.
//!
//! A client describes its analysis as an [`IdeProblem`]: five flow functions (normal,
//! call, return, call-to-return and the optional summary), the matching edge functions,
//! a zero fact, initial seeds and a value lattice. Reachability-only analyses implement the
//! smaller [`IfdsProblem`] and wrap it in an [`IfdsAdapter`].

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::edge_function::{CustomEdgeFunction, EdgeFunction, NoCustom};
use crate::flow::FlowFunction;
use crate::lattice::{BinaryDomain, JoinLattice};

/// Seeds of an analysis: `node -> fact -> initial value`.
///
/// Iteration follows insertion order, which keeps solving deterministic.
#[derive(Debug, Clone)]
pub struct InitialSeeds<N, D, L> {
    index: FxHashMap<N, usize>,
    seeds: Vec<(N, Vec<(D, L)>)>,
}

impl<N, D, L> Default for InitialSeeds<N, D, L> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            seeds: Vec::new(),
        }
    }
}

impl<N, D, L> InitialSeeds<N, D, L>
where
    N: Clone + Eq + Hash,
    D: Eq,
    L: JoinLattice,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a seed. Seeding the same `(node, fact)` twice joins the values.
    pub fn add_seed(&mut self, node: N, fact: D, value: L) {
        let index = match self.index.get(&node) {
            Some(&index) => index,
            None => {
                self.index.insert(node.clone(), self.seeds.len());
                self.seeds.push((node, Vec::new()));
                self.seeds.len() - 1
            }
        };
        let facts = &mut self.seeds[index].1;
        match facts.iter_mut().find(|(d, _)| *d == fact) {
            Some((_, existing)) => *existing = existing.join(&value),
            None => facts.push((fact, value)),
        }
    }

    /// Adds a reachability seed, valued `bottom`.
    pub fn add_fact(&mut self, node: N, fact: D) {
        self.add_seed(node, fact, L::bottom());
    }

    pub fn len(&self) -> usize {
        self.seeds.iter().map(|(_, facts)| facts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(node, fact, value)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &D, &L)> {
        self.seeds
            .iter()
            .flat_map(|(n, facts)| facts.iter().map(move |(d, l)| (n, d, l)))
    }
}

/// An IDE analysis problem.
///
/// Flow-function getters are queried at most once per edge; edge-function getters at most
/// once per exploded edge. Both must be pure.
pub trait IdeProblem {
    type Node: Clone + Eq + Hash + Debug;
    type Fact: Clone + Eq + Hash + Debug;
    type Function: Clone + Eq + Hash + Debug;
    /// The value lattice.
    ///
    /// Its `top`, `bottom` and `join` are the only lattice operations the solver uses: the
    /// value table, phase II and join nodes of the edge-function manager all go through
    /// [`JoinLattice`]. Unreached edges carry [`EdgeRef::ALL_TOP`][crate::edge_functions::EdgeRef::ALL_TOP].
    type Value: JoinLattice;
    /// Payload of client-defined edge functions.
    type Custom: CustomEdgeFunction<Self::Value>;

    /// The tautological fact.
    fn zero_fact(&self) -> Self::Fact;

    fn initial_seeds(&self) -> InitialSeeds<Self::Node, Self::Fact, Self::Value>;

    fn normal_flow_function(&self, curr: &Self::Node, succ: &Self::Node) -> FlowFunction<Self::Fact>;

    fn call_flow_function(&self, call_site: &Self::Node, callee: &Self::Function) -> FlowFunction<Self::Fact>;

    /// Maps callee exit facts to facts at `ret_site`.
    fn return_flow_function(
        &self,
        call_site: &Self::Node,
        callee: &Self::Function,
        exit: &Self::Node,
        ret_site: &Self::Node,
    ) -> FlowFunction<Self::Fact>;

    /// Facts bypassing the call.
    fn call_to_return_flow_function(
        &self,
        call_site: &Self::Node,
        ret_site: &Self::Node,
        callees: &[Self::Function],
    ) -> FlowFunction<Self::Fact>;

    /// If `Some`, replaces call and return handling for this callee with a single edge.
    fn summary_flow_function(
        &self,
        _call_site: &Self::Node,
        _callee: &Self::Function,
    ) -> Option<FlowFunction<Self::Fact>> {
        None
    }

    fn normal_edge_function(
        &self,
        _curr: &Self::Node,
        _curr_fact: &Self::Fact,
        _succ: &Self::Node,
        _succ_fact: &Self::Fact,
    ) -> EdgeFunction<Self::Value, Self::Custom> {
        EdgeFunction::Identity
    }

    fn call_edge_function(
        &self,
        _call_site: &Self::Node,
        _src_fact: &Self::Fact,
        _callee: &Self::Function,
        _dest_fact: &Self::Fact,
    ) -> EdgeFunction<Self::Value, Self::Custom> {
        EdgeFunction::Identity
    }

    #[allow(clippy::too_many_arguments)]
    fn return_edge_function(
        &self,
        _call_site: &Self::Node,
        _callee: &Self::Function,
        _exit: &Self::Node,
        _exit_fact: &Self::Fact,
        _ret_site: &Self::Node,
        _ret_fact: &Self::Fact,
    ) -> EdgeFunction<Self::Value, Self::Custom> {
        EdgeFunction::Identity
    }

    fn call_to_return_edge_function(
        &self,
        _call_site: &Self::Node,
        _call_fact: &Self::Fact,
        _ret_site: &Self::Node,
        _ret_fact: &Self::Fact,
        _callees: &[Self::Function],
    ) -> EdgeFunction<Self::Value, Self::Custom> {
        EdgeFunction::Identity
    }

    fn summary_edge_function(
        &self,
        _call_site: &Self::Node,
        _call_fact: &Self::Fact,
        _ret_site: &Self::Node,
        _ret_fact: &Self::Fact,
    ) -> EdgeFunction<Self::Value, Self::Custom> {
        EdgeFunction::Identity
    }

    /// Nodes whose results must survive aggressive jump-function GC.
    fn is_interesting(&self, _node: &Self::Node) -> bool {
        false
    }
}

/// A reachability-only (IFDS) analysis problem.
pub trait IfdsProblem {
    type Node: Clone + Eq + Hash + Debug;
    type Fact: Clone + Eq + Hash + Debug;
    type Function: Clone + Eq + Hash + Debug;

    fn zero_fact(&self) -> Self::Fact;

    fn initial_seeds(&self) -> InitialSeeds<Self::Node, Self::Fact, BinaryDomain>;

    fn normal_flow_function(&self, curr: &Self::Node, succ: &Self::Node) -> FlowFunction<Self::Fact>;

    fn call_flow_function(&self, call_site: &Self::Node, callee: &Self::Function) -> FlowFunction<Self::Fact>;

    fn return_flow_function(
        &self,
        call_site: &Self::Node,
        callee: &Self::Function,
        exit: &Self::Node,
        ret_site: &Self::Node,
    ) -> FlowFunction<Self::Fact>;

    fn call_to_return_flow_function(
        &self,
        call_site: &Self::Node,
        ret_site: &Self::Node,
        callees: &[Self::Function],
    ) -> FlowFunction<Self::Fact>;

    fn summary_flow_function(
        &self,
        _call_site: &Self::Node,
        _callee: &Self::Function,
    ) -> Option<FlowFunction<Self::Fact>> {
        None
    }

    fn is_interesting(&self, _node: &Self::Node) -> bool {
        false
    }
}

/// Presents an [`IfdsProblem`] as an [`IdeProblem`] over [`BinaryDomain`].
///
/// The adapter only holds a reference and forwards every flow-function query; all edge
/// functions are identities.
pub struct IfdsAdapter<'a, T> {
    inner: &'a T,
}

impl<'a, T: IfdsProblem> IfdsAdapter<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &'a T {
        self.inner
    }
}

impl<T: IfdsProblem> IdeProblem for IfdsAdapter<'_, T> {
    type Node = T::Node;
    type Fact = T::Fact;
    type Function = T::Function;
    type Value = BinaryDomain;
    type Custom = NoCustom;

    fn zero_fact(&self) -> T::Fact {
        self.inner.zero_fact()
    }

    fn initial_seeds(&self) -> InitialSeeds<T::Node, T::Fact, BinaryDomain> {
        self.inner.initial_seeds()
    }

    fn normal_flow_function(&self, curr: &T::Node, succ: &T::Node) -> FlowFunction<T::Fact> {
        self.inner.normal_flow_function(curr, succ)
    }

    fn call_flow_function(&self, call_site: &T::Node, callee: &T::Function) -> FlowFunction<T::Fact> {
        self.inner.call_flow_function(call_site, callee)
    }

    fn return_flow_function(
        &self,
        call_site: &T::Node,
        callee: &T::Function,
        exit: &T::Node,
        ret_site: &T::Node,
    ) -> FlowFunction<T::Fact> {
        self.inner.return_flow_function(call_site, callee, exit, ret_site)
    }

    fn call_to_return_flow_function(
        &self,
        call_site: &T::Node,
        ret_site: &T::Node,
        callees: &[T::Function],
    ) -> FlowFunction<T::Fact> {
        self.inner.call_to_return_flow_function(call_site, ret_site, callees)
    }

    fn summary_flow_function(&self, call_site: &T::Node, callee: &T::Function) -> Option<FlowFunction<T::Fact>> {
        self.inner.summary_flow_function(call_site, callee)
    }

    fn is_interesting(&self, node: &T::Node) -> bool {
        self.inner.is_interesting(node)
    }
}
