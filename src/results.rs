//! Solver results.
//!
//! [`ValueTable`] is the `(node, fact) -> value` table filled by both solver phases.
//! [`SolverResults`] wraps it together with the node and fact compressors, so results can be
//! queried by domain values.

use std::fmt;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::compressor::{BoxedCompressor, Compress, Compressor, NoneCompressor};
use crate::icfg::Icfg;
use crate::lattice::JoinLattice;
use crate::stats::SolverStats;
use crate::types::{FactId, NodeId};

/// Per-node rows of `fact -> value`, with values stored through a compressor.
pub struct ValueTable<L, VC = NoneCompressor<L>>
where
    VC: Compress<L>,
{
    rows: Vec<FxHashMap<FactId, VC::Id>>,
    values: VC,
    top: L,
}

impl<L, VC> ValueTable<L, VC>
where
    L: JoinLattice,
    VC: Compress<L> + Default,
{
    pub fn new(top: L) -> Self {
        Self {
            rows: Vec::new(),
            values: VC::default(),
            top,
        }
    }

    /// The value at `(node, fact)`, `top` if none was recorded.
    pub fn get(&self, node: NodeId, fact: FactId) -> L {
        match self.rows.get(node.index()).and_then(|row| row.get(&fact)) {
            Some(id) => self.values.get(id).clone(),
            None => self.top.clone(),
        }
    }

    pub fn set(&mut self, node: NodeId, fact: FactId, value: L) {
        if node.index() >= self.rows.len() {
            self.rows.resize_with(node.index() + 1, Default::default);
        }
        let id = self.values.get_or_insert(value);
        self.rows[node.index()].insert(fact, id);
    }

    pub fn contains(&self, node: NodeId, fact: FactId) -> bool {
        self.rows.get(node.index()).is_some_and(|row| row.contains_key(&fact))
    }

    /// True if at least one fact holds at `node`.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.rows.get(node.index()).is_some_and(|row| !row.is_empty())
    }

    /// The `(fact, value)` entries at `node`, in unspecified order.
    pub fn row(&self, node: NodeId) -> impl Iterator<Item = (FactId, &L)> + '_ {
        self.rows
            .get(node.index())
            .into_iter()
            .flat_map(move |row| row.iter().map(move |(&fact, id)| (fact, self.values.get(id))))
    }

    /// Ids of all nodes with at least one entry.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_empty())
            .map(|(i, _)| NodeId::new(i as u32))
    }

    /// Number of `(node, fact)` entries.
    pub fn len(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    /// Number of distinct values held by the value compressor.
    pub fn num_values(&self) -> usize {
        self.values.size()
    }
}

/// Read-only results of a solver run.
pub struct SolverResults<N, D, L, VC = NoneCompressor<L>>
where
    VC: Compress<L>,
{
    nodes: Compressor<N>,
    facts: BoxedCompressor<D>,
    values: ValueTable<L, VC>,
    stats: SolverStats,
}

impl<N, D, L, VC> SolverResults<N, D, L, VC>
where
    N: Clone + Eq + Hash + fmt::Debug,
    D: Clone + Eq + Hash + fmt::Debug,
    L: JoinLattice,
    VC: Compress<L> + Default,
{
    pub(crate) fn new(
        nodes: Compressor<N>,
        facts: BoxedCompressor<D>,
        values: ValueTable<L, VC>,
        stats: SolverStats,
    ) -> Self {
        Self {
            nodes,
            facts,
            values,
            stats,
        }
    }

    fn ids(&self, node: &N, fact: &D) -> Option<(NodeId, FactId)> {
        Some((
            NodeId::new(self.nodes.get_or_null(node)?),
            FactId::new(self.facts.get_or_null(fact)?),
        ))
    }

    /// The value of `fact` at `node`, `top` if the fact does not hold there.
    pub fn result_at(&self, node: &N, fact: &D) -> L {
        match self.ids(node, fact) {
            Some((n, d)) => self.values.get(n, d),
            None => self.values.top.clone(),
        }
    }

    /// All facts holding at `node` with their values.
    pub fn results_at(&self, node: &N, strip_zero: bool) -> FxHashMap<D, L> {
        let Some(n) = self.nodes.get_or_null(node) else {
            return FxHashMap::default();
        };
        self.values
            .row(NodeId::new(n))
            .filter(|(fact, _)| !(strip_zero && fact.is_zero()))
            .map(|(fact, value)| (self.facts[fact.get()].clone(), value.clone()))
            .collect()
    }

    /// The facts holding at `node`, ignoring values. Includes the zero fact.
    pub fn ifds_results_at(&self, node: &N) -> FxHashSet<D> {
        let Some(n) = self.nodes.get_or_null(node) else {
            return FxHashSet::default();
        };
        self.values
            .row(NodeId::new(n))
            .map(|(fact, _)| self.facts[fact.get()].clone())
            .collect()
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes
            .get_or_null(node)
            .is_some_and(|n| self.values.contains_node(NodeId::new(n)))
    }

    /// Number of `(node, fact)` entries.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// `(fact, value)` entries at `node`, by reference.
    pub fn row(&self, node: &N) -> Vec<(&D, &L)> {
        let Some(n) = self.nodes.get_or_null(node) else {
            return Vec::new();
        };
        self.values
            .row(NodeId::new(n))
            .map(|(fact, value)| (&self.facts[fact.get()], value))
            .collect()
    }

    /// Calls `handler` for every `(node, fact, value)` triple, nodes in id order.
    pub fn for_each_result_entry(&self, mut handler: impl FnMut(&N, &D, &L)) {
        for n in self.values.nodes() {
            let node = &self.nodes[n.get()];
            for (fact, value) in self.values.row(n) {
                handler(node, &self.facts[fact.get()], value);
            }
        }
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Writes all results grouped by function, nodes in id order, facts in id order.
    pub fn dump<I>(&self, icfg: &I, out: &mut impl fmt::Write) -> fmt::Result
    where
        I: Icfg<Node = N>,
    {
        let mut functions: Vec<I::Function> = Vec::new();
        let mut by_function: FxHashMap<I::Function, Vec<NodeId>> = FxHashMap::default();
        for n in self.values.nodes() {
            let function = icfg.function_of(&self.nodes[n.get()]);
            by_function
                .entry(function.clone())
                .or_insert_with(|| {
                    functions.push(function);
                    Vec::new()
                })
                .push(n);
        }

        writeln!(out, "### IDE results ({} entries)", self.size())?;
        for function in &functions {
            writeln!(out, "Function {:?}:", function)?;
            for &n in &by_function[function] {
                writeln!(out, "  {} {:?}", n, self.nodes[n.get()])?;
                let mut row: Vec<_> = self.values.row(n).collect();
                row.sort_by_key(|&(fact, _)| fact);
                for (fact, value) in row {
                    writeln!(out, "    {:?} -> {:?}", self.facts[fact.get()], value)?;
                }
            }
        }
        Ok(())
    }
}
