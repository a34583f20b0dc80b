//! Jump-function and end-summary storage.
//!
//! [`JumpFunctions`] holds, for every node, the best edge function known so far for each
//! `(source fact, target fact)` pair reaching it. [`EndSummaryTab`] holds, for every
//! `(function, entry fact)`, the edge functions reaching each `(exit node, exit fact)`.
//!
//! Both tables store handles only; joining is the caller's job, since only the caller owns
//! the edge-function manager.

use rustc_hash::FxHashMap;

use crate::edge_functions::EdgeRef;
use crate::types::{combine_ids, fact_pair, split_fact_pair, split_ids, FactId, FunctionId, NodeId};

/// Jump functions ending at one node, keyed by packed `(source, target)` fact pairs.
#[derive(Debug, Clone, Default)]
pub struct JumpFunctionTable {
    entries: FxHashMap<u64, EdgeRef>,
}

impl JumpFunctionTable {
    pub fn get(&self, source: FactId, target: FactId) -> Option<EdgeRef> {
        self.entries.get(&fact_pair(source, target)).copied()
    }

    /// Stores `ef`, returning the previous handle.
    pub fn insert(&mut self, source: FactId, target: FactId, ef: EdgeRef) -> Option<EdgeRef> {
        self.entries.insert(fact_pair(source, target), ef)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over `(source, target, edge function)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, FactId, EdgeRef)> + '_ {
        self.entries.iter().map(|(&key, &ef)| {
            let (source, target) = split_fact_pair(key);
            (source, target, ef)
        })
    }

    /// All `(target, edge function)` pairs whose source is `source`.
    pub fn all_of(&self, source: FactId) -> Vec<(FactId, EdgeRef)> {
        self.iter()
            .filter(|&(s, _, _)| s == source)
            .map(|(_, t, ef)| (t, ef))
            .collect()
    }
}

/// Jump-function tables of all nodes, indexed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct JumpFunctions {
    tables: Vec<JumpFunctionTable>,
}

impl JumpFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, node: NodeId) -> Option<&JumpFunctionTable> {
        self.tables.get(node.index())
    }

    pub fn table_mut(&mut self, node: NodeId) -> &mut JumpFunctionTable {
        if node.index() >= self.tables.len() {
            self.tables.resize_with(node.index() + 1, Default::default);
        }
        &mut self.tables[node.index()]
    }

    pub fn get(&self, node: NodeId, source: FactId, target: FactId) -> Option<EdgeRef> {
        self.table(node)?.get(source, target)
    }

    pub fn insert(&mut self, node: NodeId, source: FactId, target: FactId, ef: EdgeRef) -> Option<EdgeRef> {
        self.table_mut(node).insert(source, target, ef)
    }

    /// Copies out the entries of one node.
    pub fn entries(&self, node: NodeId) -> Vec<(FactId, FactId, EdgeRef)> {
        self.table(node).map(|t| t.iter().collect()).unwrap_or_default()
    }

    /// See [`JumpFunctionTable::all_of`].
    pub fn all_of(&self, node: NodeId, source: FactId) -> Vec<(FactId, EdgeRef)> {
        self.table(node).map(|t| t.all_of(source)).unwrap_or_default()
    }

    /// Drops all entries at `node`, returning how many there were.
    pub fn clear_node(&mut self, node: NodeId) -> usize {
        match self.tables.get_mut(node.index()) {
            Some(table) => {
                let n = table.len();
                table.clear();
                n
            }
            None => 0,
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.tables.iter().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.is_empty())
    }

    /// All stored edge-function handles.
    pub fn edge_functions(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.tables.iter().flat_map(|t| t.entries.values().copied())
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

/// End summaries: `(function, entry fact) -> (exit node, exit fact) -> edge function`.
#[derive(Debug, Clone, Default)]
pub struct EndSummaryTab {
    summaries: FxHashMap<u64, FxHashMap<u64, EdgeRef>>,
}

impl EndSummaryTab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: FunctionId, entry: FactId, exit: NodeId, exit_fact: FactId) -> Option<EdgeRef> {
        self.summaries
            .get(&combine_ids(function.get(), entry.get()))?
            .get(&combine_ids(exit.get(), exit_fact.get()))
            .copied()
    }

    /// Stores `ef`, returning the previous handle.
    pub fn insert(
        &mut self,
        function: FunctionId,
        entry: FactId,
        exit: NodeId,
        exit_fact: FactId,
        ef: EdgeRef,
    ) -> Option<EdgeRef> {
        self.summaries
            .entry(combine_ids(function.get(), entry.get()))
            .or_default()
            .insert(combine_ids(exit.get(), exit_fact.get()), ef)
    }

    /// Summaries of `function` entered with `entry` that leave through `exit`, as `(exit fact, edge function)`.
    pub fn summaries_at(&self, function: FunctionId, entry: FactId, exit: NodeId) -> Vec<(FactId, EdgeRef)> {
        let Some(table) = self.summaries.get(&combine_ids(function.get(), entry.get())) else {
            return Vec::new();
        };
        table
            .iter()
            .filter_map(|(&key, &ef)| {
                let (node, fact) = split_ids(key);
                (node == exit.get()).then_some((FactId::new(fact), ef))
            })
            .collect()
    }

    /// Total number of stored summaries.
    pub fn len(&self) -> usize {
        self.summaries.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.values().all(|t| t.is_empty())
    }

    pub fn edge_functions(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.summaries.values().flat_map(|t| t.values().copied())
    }

    pub fn clear(&mut self) {
        self.summaries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(i: u32) -> FactId {
        FactId::new(i)
    }

    fn n(i: u32) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn test_table_insert_get() {
        let mut jfs = JumpFunctions::new();
        assert_eq!(jfs.get(n(3), d(0), d(1)), None);
        assert_eq!(jfs.insert(n(3), d(0), d(1), EdgeRef::IDENTITY), None);
        assert_eq!(jfs.insert(n(3), d(0), d(1), EdgeRef::ALL_BOTTOM), Some(EdgeRef::IDENTITY));
        assert_eq!(jfs.get(n(3), d(0), d(1)), Some(EdgeRef::ALL_BOTTOM));
        assert_eq!(jfs.entries(n(3)), vec![(d(0), d(1), EdgeRef::ALL_BOTTOM)]);
        assert!(jfs.entries(n(0)).is_empty());
        assert_eq!(jfs.len(), 1);
    }

    #[test]
    fn test_all_of() {
        let mut jfs = JumpFunctions::new();
        jfs.insert(n(0), d(1), d(2), EdgeRef::IDENTITY);
        jfs.insert(n(0), d(1), d(3), EdgeRef::ALL_TOP);
        jfs.insert(n(0), d(4), d(2), EdgeRef::IDENTITY);
        let mut found = jfs.all_of(n(0), d(1));
        found.sort();
        assert_eq!(found, vec![(d(2), EdgeRef::IDENTITY), (d(3), EdgeRef::ALL_TOP)]);
        assert!(jfs.all_of(n(9), d(1)).is_empty());
    }

    #[test]
    fn test_clear_node() {
        let mut jfs = JumpFunctions::new();
        jfs.insert(n(1), d(0), d(0), EdgeRef::IDENTITY);
        jfs.insert(n(1), d(0), d(5), EdgeRef::IDENTITY);
        jfs.insert(n(2), d(0), d(0), EdgeRef::IDENTITY);
        assert_eq!(jfs.clear_node(n(1)), 2);
        assert_eq!(jfs.clear_node(n(7)), 0);
        assert_eq!(jfs.len(), 1);
        assert_eq!(jfs.edge_functions().count(), 1);
    }

    #[test]
    fn test_end_summaries_per_exit() {
        let f = FunctionId::new(1);
        let mut tab = EndSummaryTab::new();
        tab.insert(f, d(0), n(10), d(0), EdgeRef::IDENTITY);
        tab.insert(f, d(0), n(10), d(3), EdgeRef::ALL_BOTTOM);
        tab.insert(f, d(0), n(11), d(4), EdgeRef::IDENTITY);
        tab.insert(f, d(2), n(10), d(2), EdgeRef::IDENTITY);

        let mut at10 = tab.summaries_at(f, d(0), n(10));
        at10.sort();
        assert_eq!(at10, vec![(d(0), EdgeRef::IDENTITY), (d(3), EdgeRef::ALL_BOTTOM)]);
        assert_eq!(tab.summaries_at(f, d(0), n(11)), vec![(d(4), EdgeRef::IDENTITY)]);
        assert!(tab.summaries_at(f, d(1), n(10)).is_empty());
        assert_eq!(tab.get(f, d(2), n(10), d(2)), Some(EdgeRef::IDENTITY));
        assert_eq!(tab.len(), 4);
    }
}
