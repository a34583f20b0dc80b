//! Memoized flow and edge functions.
//!
//! The solver asks the problem for each flow function at most once per edge and for each
//! edge function at most once per exploded edge. Keys are packed ids:
//!
//! | table           | key                                             |
//! |-----------------|-------------------------------------------------|
//! | normal          | `(curr, succ)`, plus the fact pair for edges    |
//! | call            | `(call site, callee)`                           |
//! | return          | `(call site, exit)`, return site                |
//! | call-to-return  | `(call site, return site)`                      |
//! | summary         | `(call site, callee)` for flow, `(call site, return site)` for edges |
//!
//! Edge-function entries are [`EdgeRef`]s into the solver's manager and must be dropped
//! (see [`clear_edge_functions`][FlowEdgeFunctionCache::clear_edge_functions]) before that
//! manager collects garbage.

use std::rc::Rc;

use crate::cache::Cache;
use crate::edge_functions::{EdgeFunctions, EdgeRef};
use crate::flow::FlowFunction;
use crate::problem::IdeProblem;
use crate::types::NodeId;

type Flow<P> = Rc<FlowFunction<<P as IdeProblem>::Fact>>;
type Manager<P> = EdgeFunctions<<P as IdeProblem>::Value, <P as IdeProblem>::Custom>;

pub struct FlowEdgeFunctionCache<P: IdeProblem> {
    zero: P::Fact,
    auto_add_zero: bool,

    normal_flow: Cache<u64, Flow<P>>,
    call_flow: Cache<u64, Flow<P>>,
    return_flow: Cache<(u64, NodeId), Flow<P>>,
    call_to_return_flow: Cache<u64, Flow<P>>,
    summary_flow: Cache<u64, Option<Flow<P>>>,

    normal_edge: Cache<(u64, u64), EdgeRef>,
    call_edge: Cache<(u64, u64), EdgeRef>,
    return_edge: Cache<(u64, NodeId, u64), EdgeRef>,
    call_to_return_edge: Cache<(u64, u64), EdgeRef>,
    summary_edge: Cache<(u64, u64), EdgeRef>,
}

impl<P: IdeProblem> FlowEdgeFunctionCache<P> {
    pub fn new(zero: P::Fact, auto_add_zero: bool) -> Self {
        Self {
            zero,
            auto_add_zero,
            normal_flow: Cache::new(),
            call_flow: Cache::new(),
            return_flow: Cache::new(),
            call_to_return_flow: Cache::new(),
            summary_flow: Cache::new(),
            normal_edge: Cache::new(),
            call_edge: Cache::new(),
            return_edge: Cache::new(),
            call_to_return_edge: Cache::new(),
            summary_edge: Cache::new(),
        }
    }

    /// Applies `ff` to `source`. With auto-add-zero, the zero fact always reaches itself.
    pub fn compute_targets(&self, ff: &FlowFunction<P::Fact>, source: &P::Fact) -> Vec<P::Fact> {
        let mut targets = ff.compute_targets(source);
        if self.auto_add_zero && *source == self.zero && !targets.contains(&self.zero) {
            targets.push(self.zero.clone());
        }
        targets
    }

    pub fn normal_flow(&mut self, problem: &P, curr: &P::Node, succ: &P::Node, key: u64) -> Flow<P> {
        Rc::clone(
            self.normal_flow
                .get_or_insert_with(key, || Rc::new(problem.normal_flow_function(curr, succ))),
        )
    }

    pub fn call_flow(&mut self, problem: &P, call_site: &P::Node, callee: &P::Function, key: u64) -> Flow<P> {
        Rc::clone(
            self.call_flow
                .get_or_insert_with(key, || Rc::new(problem.call_flow_function(call_site, callee))),
        )
    }

    pub fn return_flow(
        &mut self,
        problem: &P,
        call_site: &P::Node,
        callee: &P::Function,
        exit: &P::Node,
        ret_site: &P::Node,
        key: (u64, NodeId),
    ) -> Flow<P> {
        Rc::clone(self.return_flow.get_or_insert_with(key, || {
            Rc::new(problem.return_flow_function(call_site, callee, exit, ret_site))
        }))
    }

    pub fn call_to_return_flow(
        &mut self,
        problem: &P,
        call_site: &P::Node,
        ret_site: &P::Node,
        callees: &[P::Function],
        key: u64,
    ) -> Flow<P> {
        Rc::clone(self.call_to_return_flow.get_or_insert_with(key, || {
            Rc::new(problem.call_to_return_flow_function(call_site, ret_site, callees))
        }))
    }

    pub fn summary_flow(
        &mut self,
        problem: &P,
        call_site: &P::Node,
        callee: &P::Function,
        key: u64,
    ) -> Option<Flow<P>> {
        self.summary_flow
            .get_or_insert_with(key, || problem.summary_flow_function(call_site, callee).map(Rc::new))
            .clone()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn normal_edge(
        &mut self,
        problem: &P,
        manager: &mut Manager<P>,
        curr: &P::Node,
        curr_fact: &P::Fact,
        succ: &P::Node,
        succ_fact: &P::Fact,
        node_key: u64,
        fact_key: u64,
    ) -> EdgeRef {
        *self.normal_edge.get_or_insert_with((node_key, fact_key), || {
            manager.leaf(problem.normal_edge_function(curr, curr_fact, succ, succ_fact))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call_edge(
        &mut self,
        problem: &P,
        manager: &mut Manager<P>,
        call_site: &P::Node,
        src_fact: &P::Fact,
        callee: &P::Function,
        dest_fact: &P::Fact,
        node_key: u64,
        fact_key: u64,
    ) -> EdgeRef {
        *self.call_edge.get_or_insert_with((node_key, fact_key), || {
            manager.leaf(problem.call_edge_function(call_site, src_fact, callee, dest_fact))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn return_edge(
        &mut self,
        problem: &P,
        manager: &mut Manager<P>,
        call_site: &P::Node,
        callee: &P::Function,
        exit: &P::Node,
        exit_fact: &P::Fact,
        ret_site: &P::Node,
        ret_fact: &P::Fact,
        key: (u64, NodeId, u64),
    ) -> EdgeRef {
        *self.return_edge.get_or_insert_with(key, || {
            manager.leaf(problem.return_edge_function(call_site, callee, exit, exit_fact, ret_site, ret_fact))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call_to_return_edge(
        &mut self,
        problem: &P,
        manager: &mut Manager<P>,
        call_site: &P::Node,
        call_fact: &P::Fact,
        ret_site: &P::Node,
        ret_fact: &P::Fact,
        callees: &[P::Function],
        node_key: u64,
        fact_key: u64,
    ) -> EdgeRef {
        *self.call_to_return_edge.get_or_insert_with((node_key, fact_key), || {
            manager.leaf(problem.call_to_return_edge_function(call_site, call_fact, ret_site, ret_fact, callees))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn summary_edge(
        &mut self,
        problem: &P,
        manager: &mut Manager<P>,
        call_site: &P::Node,
        call_fact: &P::Fact,
        ret_site: &P::Node,
        ret_fact: &P::Fact,
        node_key: u64,
        fact_key: u64,
    ) -> EdgeRef {
        *self.summary_edge.get_or_insert_with((node_key, fact_key), || {
            manager.leaf(problem.summary_edge_function(call_site, call_fact, ret_site, ret_fact))
        })
    }

    pub fn flow_hits(&self) -> usize {
        self.normal_flow.hits()
            + self.call_flow.hits()
            + self.return_flow.hits()
            + self.call_to_return_flow.hits()
            + self.summary_flow.hits()
    }

    pub fn flow_misses(&self) -> usize {
        self.normal_flow.misses()
            + self.call_flow.misses()
            + self.return_flow.misses()
            + self.call_to_return_flow.misses()
            + self.summary_flow.misses()
    }

    pub fn edge_hits(&self) -> usize {
        self.normal_edge.hits()
            + self.call_edge.hits()
            + self.return_edge.hits()
            + self.call_to_return_edge.hits()
            + self.summary_edge.hits()
    }

    pub fn edge_misses(&self) -> usize {
        self.normal_edge.misses()
            + self.call_edge.misses()
            + self.return_edge.misses()
            + self.call_to_return_edge.misses()
            + self.summary_edge.misses()
    }

    pub fn clear_flow_functions(&mut self) {
        self.normal_flow.clear();
        self.call_flow.clear();
        self.return_flow.clear();
        self.call_to_return_flow.clear();
        self.summary_flow.clear();
    }

    pub fn clear_edge_functions(&mut self) {
        self.normal_edge.clear();
        self.call_edge.clear();
        self.return_edge.clear();
        self.call_to_return_edge.clear();
        self.summary_edge.clear();
    }

    pub fn clear(&mut self) {
        self.clear_flow_functions();
        self.clear_edge_functions();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::edge_function::{EdgeFunction, NoCustom};
    use crate::lattice::Flat;
    use crate::problem::InitialSeeds;
    use crate::types::combine_ids;

    /// Counts how often the solver would have asked the problem.
    #[derive(Default)]
    struct Counting {
        normal_flow_calls: Cell<usize>,
        normal_edge_calls: Cell<usize>,
    }

    impl IdeProblem for Counting {
        type Node = u32;
        type Fact = u32;
        type Function = u32;
        type Value = Flat<i64>;
        type Custom = NoCustom;

        fn zero_fact(&self) -> u32 {
            0
        }

        fn initial_seeds(&self) -> InitialSeeds<u32, u32, Flat<i64>> {
            InitialSeeds::new()
        }

        fn normal_flow_function(&self, _: &u32, _: &u32) -> FlowFunction<u32> {
            self.normal_flow_calls.set(self.normal_flow_calls.get() + 1);
            FlowFunction::Kill(0)
        }

        fn call_flow_function(&self, _: &u32, _: &u32) -> FlowFunction<u32> {
            FlowFunction::KillAll
        }

        fn return_flow_function(&self, _: &u32, _: &u32, _: &u32, _: &u32) -> FlowFunction<u32> {
            FlowFunction::KillAll
        }

        fn call_to_return_flow_function(&self, _: &u32, _: &u32, _: &[u32]) -> FlowFunction<u32> {
            FlowFunction::Identity
        }

        fn normal_edge_function(&self, _: &u32, _: &u32, _: &u32, _: &u32) -> EdgeFunction<Flat<i64>, NoCustom> {
            self.normal_edge_calls.set(self.normal_edge_calls.get() + 1);
            EdgeFunction::Constant(Flat::Value(42))
        }
    }

    #[test]
    fn test_flow_functions_are_memoized() {
        let problem = Counting::default();
        let mut cache = FlowEdgeFunctionCache::<Counting>::new(0, true);
        let key = combine_ids(1, 2);
        for _ in 0..3 {
            let ff = cache.normal_flow(&problem, &1, &2, key);
            assert_eq!(cache.compute_targets(&ff, &5), vec![5]);
        }
        assert_eq!(problem.normal_flow_calls.get(), 1);
        assert_eq!(cache.flow_hits(), 2);
        assert_eq!(cache.flow_misses(), 1);

        cache.clear_flow_functions();
        let _ = cache.normal_flow(&problem, &1, &2, key);
        assert_eq!(problem.normal_flow_calls.get(), 2);
    }

    #[test]
    fn test_auto_add_zero() {
        let problem = Counting::default();
        let mut with_zero = FlowEdgeFunctionCache::<Counting>::new(0, true);
        let ff = with_zero.normal_flow(&problem, &1, &2, 0);
        assert_eq!(with_zero.compute_targets(&ff, &0), vec![0]);

        let without_zero = FlowEdgeFunctionCache::<Counting>::new(0, false);
        assert!(without_zero.compute_targets(&ff, &0).is_empty());
    }

    #[test]
    fn test_edge_functions_are_memoized() {
        let problem = Counting::default();
        let mut manager = EdgeFunctions::default();
        let mut cache = FlowEdgeFunctionCache::<Counting>::new(0, true);
        let a = cache.normal_edge(&problem, &mut manager, &1, &0, &2, &3, 7, 9);
        let b = cache.normal_edge(&problem, &mut manager, &1, &0, &2, &3, 7, 9);
        assert_eq!(a, b);
        assert_eq!(problem.normal_edge_calls.get(), 1);
        assert_eq!(manager.constant_value(a), Some(Flat::Value(42)));
        assert_eq!(cache.edge_hits(), 1);
        assert_eq!(cache.edge_misses(), 1);
    }
}
