//! The IDE solver.
//!
//! [`IdeSolver`] runs in two phases:
//!
//! 1. **Fact propagation.** Jump functions `(node, source fact, target fact) -> edge function`
//!    are propagated through the ICFG by a worklist. When a fact enters a callee, the call is
//!    recorded as an inter-propagation job; summaries already known for the callee are applied
//!    right away, summaries that appear later are applied in a reconciliation step at the end
//!    of each round. Optionally, the jump functions of procedures without pending work are
//!    garbage-collected between rounds.
//! 2. **Value computation** (IDE mode only). Seed values are pushed along the recorded calls
//!    into callee start points, then every jump function is evaluated against the value of its
//!    source fact at the start point.
//!
//! All domain values are interned on first sight, so the hot path works on dense ids only.

use log::{debug, info, trace};
use rustc_hash::FxHashSet;

use crate::bitset::BitSet;
use crate::compressor::{BoxedCompressor, Compress, Compressor, NoneCompressor};
use crate::config::SolverConfig;
use crate::edge_functions::{EdgeFunctions, EdgeRef};
use crate::flow_cache::FlowEdgeFunctionCache;
use crate::gc::JumpFunctionGc;
use crate::icfg::Icfg;
use crate::inter_jobs::{InterJobLedger, InterPropagationJob, JobIdx};
use crate::jump_functions::{EndSummaryTab, JumpFunctions};
use crate::lattice::JoinLattice;
use crate::problem::IdeProblem;
use crate::results::{SolverResults, ValueTable};
use crate::stats::SolverStats;
use crate::types::{combine_ids, fact_pair, split_ids, FactId, FunctionId, NodeId};
use crate::worklist::{CallWorklist, Worklist};

/// A pending jump function: `edge_function` takes `source_fact` at the start point of the
/// enclosing function to `target_fact` at `node`.
#[derive(Debug, Copy, Clone)]
struct PropagationJob {
    node: NodeId,
    source_fact: FactId,
    target_fact: FactId,
    edge_function: EdgeRef,
}

#[derive(Debug, Clone)]
struct ValueJob<L> {
    node: NodeId,
    fact: FactId,
    value: L,
}

pub struct IdeSolver<'a, P, I, VC = NoneCompressor<<P as IdeProblem>::Value>>
where
    P: IdeProblem,
    I: Icfg<Node = P::Node, Function = P::Function>,
    VC: Compress<P::Value>,
{
    problem: &'a P,
    icfg: &'a I,
    config: SolverConfig,

    nodes: Compressor<P::Node>,
    facts: BoxedCompressor<P::Fact>,
    functions: Compressor<P::Function>,

    edge_functions: EdgeFunctions<P::Value, P::Custom>,
    cache: FlowEdgeFunctionCache<P>,

    jump_functions: JumpFunctions,
    num_live_jump_functions: usize,
    end_summaries: EndSummaryTab,
    inter_jobs: InterJobLedger,
    worklist: Worklist<PropagationJob>,
    call_worklist: CallWorklist,
    gc: JumpFunctionGc,

    value_seeds: Vec<ValueJob<P::Value>>,
    values: ValueTable<P::Value, VC>,

    fact_propagation_done: bool,
    stats: SolverStats,
}

impl<'a, P, I> IdeSolver<'a, P, I>
where
    P: IdeProblem,
    I: Icfg<Node = P::Node, Function = P::Function>,
{
    /// Creates a solver storing result values as they are.
    pub fn new(problem: &'a P, icfg: &'a I, config: SolverConfig) -> Self {
        Self::with_value_compressor(problem, icfg, config)
    }
}

impl<'a, P, I, VC> IdeSolver<'a, P, I, VC>
where
    P: IdeProblem,
    I: Icfg<Node = P::Node, Function = P::Function>,
    VC: Compress<P::Value> + Default,
{
    /// Creates a solver interning result values through `VC`.
    ///
    /// Worth it for lattices with large values that repeat across many nodes.
    pub fn with_value_compressor(problem: &'a P, icfg: &'a I, config: SolverConfig) -> Self {
        let mut facts = BoxedCompressor::new();
        let zero = facts.get_or_insert(problem.zero_fact());
        assert_eq!(zero, FactId::ZERO.get(), "Zero fact must receive id 0");

        let mut functions = Compressor::new();
        for function in icfg.all_functions() {
            functions.get_or_insert(function);
        }

        let mut nodes = Compressor::new();
        nodes.reserve(icfg.num_call_sites());

        debug!(
            "Created solver for {} functions with {:?}",
            functions.size(),
            config
        );

        Self {
            problem,
            icfg,
            nodes,
            facts,
            edge_functions: EdgeFunctions::new(config.join_limit),
            cache: FlowEdgeFunctionCache::new(problem.zero_fact(), config.auto_add_zero),
            jump_functions: JumpFunctions::new(),
            num_live_jump_functions: 0,
            end_summaries: EndSummaryTab::new(),
            inter_jobs: InterJobLedger::new(),
            worklist: Worklist::new(config.worklist_order),
            call_worklist: CallWorklist::new(),
            gc: JumpFunctionGc::new(functions.size()),
            functions,
            value_seeds: Vec::new(),
            values: ValueTable::new(P::Value::top()),
            fact_propagation_done: false,
            stats: SolverStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// The edge-function manager. Handles returned by [`jump_function_at`][Self::jump_function_at]
    /// point into it.
    pub fn edge_functions(&self) -> &EdgeFunctions<P::Value, P::Custom> {
        &self.edge_functions
    }

    pub fn edge_functions_mut(&mut self) -> &mut EdgeFunctions<P::Value, P::Custom> {
        &mut self.edge_functions
    }

    /// The jump function from `source` at the start point to `target` at `node`, if one exists.
    pub fn jump_function_at(&self, node: &P::Node, source: &P::Fact, target: &P::Fact) -> Option<EdgeRef> {
        let node = NodeId::new(self.nodes.get_or_null(node)?);
        let source = FactId::new(self.facts.get_or_null(source)?);
        let target = FactId::new(self.facts.get_or_null(target)?);
        self.jump_functions.get(node, source, target)
    }

    /// Runs both phases and returns the results.
    pub fn solve(mut self) -> SolverResults<P::Node, P::Fact, P::Value, VC> {
        info!("Solving...");
        self.solve_fact_propagation();
        self.finish_fact_propagation();
        if self.config.compute_values {
            self.compute_values();
        }
        self.record_stats();
        info!("Done solving. {}", self.stats);
        SolverResults::new(self.nodes, self.facts, self.values, self.stats)
    }

    fn node_id(&mut self, node: P::Node) -> NodeId {
        NodeId::new(self.nodes.get_or_insert(node))
    }

    fn fact_id(&mut self, fact: P::Fact) -> FactId {
        FactId::new(self.facts.get_or_insert(fact))
    }

    fn function_id(&mut self, function: P::Function) -> FunctionId {
        FunctionId::new(self.functions.get_or_insert(function))
    }

    fn submit_initial_seeds(&mut self) {
        let seeds = self.problem.initial_seeds();
        info!("Submitting {} initial seeds", seeds.len());
        for (node, fact, value) in seeds.iter() {
            let n = self.node_id(node.clone());
            let d = self.fact_id(fact.clone());
            let f = self.function_id(self.icfg.function_of(node));
            self.value_seeds.push(ValueJob {
                node: n,
                fact: d,
                value: value.clone(),
            });
            self.store_and_propagate(n, d, d, f, EdgeRef::IDENTITY);
        }
    }

    /// Phase I: propagates jump functions until a fixpoint is reached.
    ///
    /// Jump functions stay available through [`jump_function_at`][Self::jump_function_at]
    /// until [`solve`][Self::solve] is called. Does nothing when called again.
    pub fn solve_fact_propagation(&mut self) {
        if self.fact_propagation_done {
            return;
        }
        self.submit_initial_seeds();

        loop {
            self.stats.num_rounds += 1;

            let mut processed = 0;
            while let Some(job) = self.worklist.pop() {
                self.propagate(job);
                processed += 1;
            }
            debug_assert!(
                !self.config.gc_mode.is_enabled() || self.gc.all_released(),
                "Worklist is empty, but some functions still have pending jump functions"
            );

            info!(
                "Round {}: processed {} jobs, {} relevant calls",
                self.stats.num_rounds,
                processed,
                self.call_worklist.len()
            );
            self.process_inter_jobs();

            if self.config.gc_mode.is_enabled() {
                self.collect_jump_functions();
                if self.config.collect_edge_functions && self.config.compute_values {
                    self.collect_edge_functions();
                }
            }

            if self.worklist.is_empty() {
                break;
            }
        }

        self.fact_propagation_done = true;
        info!(
            "Fact propagation done after {} rounds: {} jump functions alive",
            self.stats.num_rounds, self.num_live_jump_functions
        );
    }

    fn finish_fact_propagation(&mut self) {
        self.record_stats();
        self.cache.clear();
        self.inter_jobs.clear_by_callee();
        self.worklist.clear();
        self.call_worklist.clear();
        if self.config.collect_edge_functions && self.config.compute_values {
            self.collect_edge_functions();
        }
    }

    /// Records `ef` as the jump function `(source -> target)` at `node`, joining with what is
    /// already there, and schedules it if it changed.
    fn store_and_propagate(
        &mut self,
        node: NodeId,
        source: FactId,
        target: FactId,
        function: FunctionId,
        ef: EdgeRef,
    ) {
        let ef = if self.config.compute_values { ef } else { EdgeRef::IDENTITY };

        let prev = self.jump_functions.get(node, source, target);
        let stored = match prev {
            None => ef,
            Some(_) if !self.config.compute_values => return,
            Some(old) => {
                let joined = self.edge_functions.join(old, ef);
                if joined == old {
                    return;
                }
                joined
            }
        };

        trace!(
            "Storing {} -> {} at {}: {}",
            source,
            target,
            node,
            self.edge_functions.display(stored)
        );
        self.jump_functions.insert(node, source, target, stored);

        if prev.is_none() {
            self.num_live_jump_functions += 1;
            if !self.values.contains(node, target) {
                let keep = !self.config.gc_mode.is_aggressive() || {
                    let node = self.nodes[node.get()].clone();
                    self.keep_information_at(&node, true)
                };
                if keep {
                    self.values.set(node, target, P::Value::top());
                }
            }
        }
        self.stats.path_edge_created(self.num_live_jump_functions);

        self.worklist.push(PropagationJob {
            node,
            source_fact: source,
            target_fact: target,
            edge_function: stored,
        });
        if self.config.gc_mode.is_enabled() {
            self.gc.retain(function);
        }
    }

    fn propagate(&mut self, job: PropagationJob) {
        let node = self.nodes[job.node.get()].clone();
        let function = self.function_id(self.icfg.function_of(&node));
        if self.config.gc_mode.is_enabled() {
            self.gc.release(function);
        }

        debug!(
            "Propagating {} -> {} at {:?} with {}",
            job.source_fact,
            job.target_fact,
            node,
            self.edge_functions.display(job.edge_function)
        );

        if self.icfg.is_call_site(&node) {
            self.propagate_call(&job, &node, function);
        } else {
            self.propagate_normal(&job, &node, function);
        }
    }

    fn propagate_normal(&mut self, job: &PropagationJob, node: &P::Node, function: FunctionId) {
        let (problem, icfg) = (self.problem, self.icfg);
        let fact = self.facts.shared(job.target_fact.get());

        for succ in icfg.succs_of(node) {
            let succ_id = self.node_id(succ.clone());
            let key = combine_ids(job.node.get(), succ_id.get());
            let ff = self.cache.normal_flow(problem, node, &succ, key);
            for target in self.cache.compute_targets(&ff, &fact) {
                let target_id = self.fact_id(target.clone());
                let ef = if self.config.compute_values {
                    let edge = self.cache.normal_edge(
                        problem,
                        &mut self.edge_functions,
                        node,
                        &fact,
                        &succ,
                        &target,
                        key,
                        fact_pair(job.target_fact, target_id),
                    );
                    self.edge_functions.compose(job.edge_function, edge)
                } else {
                    EdgeRef::IDENTITY
                };
                self.store_and_propagate(succ_id, job.source_fact, target_id, function, ef);
            }
        }

        if icfg.is_exit_inst(node) {
            self.record_end_summary(job, function);
        }
    }

    fn record_end_summary(&mut self, job: &PropagationJob, function: FunctionId) {
        self.call_worklist
            .insert(combine_ids(job.source_fact.get(), function.get()));

        if !self.config.use_end_summary_tab {
            return;
        }
        let ef = job.edge_function;
        match self
            .end_summaries
            .get(function, job.source_fact, job.node, job.target_fact)
        {
            None => {
                self.end_summaries
                    .insert(function, job.source_fact, job.node, job.target_fact, ef);
                self.stats.num_end_summaries += 1;
            }
            Some(old) if self.config.compute_values => {
                let joined = self.edge_functions.join(old, ef);
                if joined != old {
                    self.end_summaries
                        .insert(function, job.source_fact, job.node, job.target_fact, joined);
                }
            }
            Some(_) => {}
        }
    }

    fn propagate_call(&mut self, job: &PropagationJob, call_site: &P::Node, function: FunctionId) {
        let (problem, icfg) = (self.problem, self.icfg);
        let fact = self.facts.shared(job.target_fact.get());
        let callees = icfg.callees_of_call_at(call_site);
        let ret_sites = icfg.return_sites_of_call_at(call_site);

        for ret_site in &ret_sites {
            let ret_site_id = self.node_id(ret_site.clone());
            let key = combine_ids(job.node.get(), ret_site_id.get());
            let ff = self
                .cache
                .call_to_return_flow(problem, call_site, ret_site, &callees, key);
            for target in self.cache.compute_targets(&ff, &fact) {
                let target_id = self.fact_id(target.clone());
                let ef = if self.config.compute_values {
                    let edge = self.cache.call_to_return_edge(
                        problem,
                        &mut self.edge_functions,
                        call_site,
                        &fact,
                        ret_site,
                        &target,
                        &callees,
                        key,
                        fact_pair(job.target_fact, target_id),
                    );
                    self.edge_functions.compose(job.edge_function, edge)
                } else {
                    EdgeRef::IDENTITY
                };
                self.store_and_propagate(ret_site_id, job.source_fact, target_id, function, ef);
            }
        }

        for callee in &callees {
            let callee_id = self.function_id(callee.clone());
            let key = combine_ids(job.node.get(), callee_id.get());

            let Some(summary) = self.cache.summary_flow(problem, call_site, callee, key) else {
                self.defer_call_flow(job, call_site, callee, callee_id, key);
                continue;
            };

            debug!("Applying summary flow function for {:?} at {:?}", callee, call_site);
            for ret_site in &ret_sites {
                let ret_site_id = self.node_id(ret_site.clone());
                let ret_key = combine_ids(job.node.get(), ret_site_id.get());
                for target in self.cache.compute_targets(&summary, &fact) {
                    let target_id = self.fact_id(target.clone());
                    let ef = if self.config.compute_values {
                        let edge = self.cache.summary_edge(
                            problem,
                            &mut self.edge_functions,
                            call_site,
                            &fact,
                            ret_site,
                            &target,
                            ret_key,
                            fact_pair(job.target_fact, target_id),
                        );
                        self.edge_functions.compose(job.edge_function, edge)
                    } else {
                        EdgeRef::IDENTITY
                    };
                    self.store_and_propagate(ret_site_id, job.source_fact, target_id, function, ef);
                }
            }
        }
    }

    /// Passes the facts flowing into `callee` to its start points and records the call.
    fn defer_call_flow(
        &mut self,
        job: &PropagationJob,
        call_site: &P::Node,
        callee: &P::Function,
        callee_id: FunctionId,
        key: u64,
    ) {
        let (problem, icfg) = (self.problem, self.icfg);
        let start_points = icfg.start_points_of(callee);
        if start_points.is_empty() {
            debug!("Callee {:?} has no body", callee);
            return;
        }

        let fact = self.facts.shared(job.target_fact.get());
        let ff = self.cache.call_flow(problem, call_site, callee, key);
        for callee_fact in self.cache.compute_targets(&ff, &fact) {
            let callee_fact_id = self.fact_id(callee_fact.clone());
            let call_ef = if self.config.compute_values {
                let edge = self.cache.call_edge(
                    problem,
                    &mut self.edge_functions,
                    call_site,
                    &fact,
                    callee,
                    &callee_fact,
                    key,
                    fact_pair(job.target_fact, callee_fact_id),
                );
                self.edge_functions.compose(job.edge_function, edge)
            } else {
                EdgeRef::IDENTITY
            };

            for sp in &start_points {
                let sp_id = self.node_id(sp.clone());
                self.store_and_propagate(sp_id, callee_fact_id, callee_fact_id, callee_id, EdgeRef::IDENTITY);
            }

            match self
                .inter_jobs
                .insert(call_ef, job.source_fact, callee_id, job.node, callee_fact_id)
            {
                Some(idx) => {
                    self.stats.num_inter_jobs += 1;
                    self.apply_early_summaries(idx, callee);
                    self.inter_jobs.link(idx, self.config.compute_values);
                }
                None => self.stats.num_inter_jobs_deduplicated += 1,
            }
        }
    }

    /// Applies the summaries `callee` already has for the job's entry fact.
    fn apply_early_summaries(&mut self, idx: JobIdx, callee: &P::Function) {
        let job = self.inter_jobs.get(idx).clone();
        for exit in self.icfg.exit_points_of(callee) {
            let exit_id = self.node_id(exit.clone());
            let summaries = self.summaries_for(job.callee, job.fact_in_callee, exit_id);
            if !summaries.is_empty() {
                self.propagate_procedure_summaries(&job, &exit, exit_id, &summaries);
            }
        }
    }

    /// `(exit fact, edge function)` pairs of `function` entered with `entry`, leaving via `exit`.
    fn summaries_for(&self, function: FunctionId, entry: FactId, exit: NodeId) -> Vec<(FactId, EdgeRef)> {
        if self.config.use_end_summary_tab {
            self.end_summaries.summaries_at(function, entry, exit)
        } else {
            self.jump_functions.all_of(exit, entry)
        }
    }

    /// Applies callee summaries to one recorded call, producing jump functions at the return sites.
    fn propagate_procedure_summaries(
        &mut self,
        job: &InterPropagationJob,
        exit: &P::Node,
        exit_id: NodeId,
        summaries: &[(FactId, EdgeRef)],
    ) {
        let (problem, icfg) = (self.problem, self.icfg);
        let call_site = self.nodes[job.call_site.get()].clone();
        let callee = self.functions[job.callee.get()].clone();
        let caller = self.function_id(icfg.function_of(&call_site));
        let call_exit_key = combine_ids(job.call_site.get(), exit_id.get());

        for ret_site in icfg.return_sites_of_call_at(&call_site) {
            let ret_site_id = self.node_id(ret_site.clone());
            let ff = self
                .cache
                .return_flow(problem, &call_site, &callee, exit, &ret_site, (call_exit_key, ret_site_id));

            for &(exit_fact_id, summary_ef) in summaries {
                let exit_fact = self.facts.shared(exit_fact_id.get());
                for target in self.cache.compute_targets(&ff, &exit_fact) {
                    let target_id = self.fact_id(target.clone());
                    let ef = if self.config.compute_values {
                        let return_ef = self.cache.return_edge(
                            problem,
                            &mut self.edge_functions,
                            &call_site,
                            &callee,
                            exit,
                            &exit_fact,
                            &ret_site,
                            &target,
                            (call_exit_key, ret_site_id, fact_pair(exit_fact_id, target_id)),
                        );
                        let through = self.edge_functions.compose(job.edge_function, summary_ef);
                        self.edge_functions.compose(through, return_ef)
                    } else {
                        EdgeRef::IDENTITY
                    };
                    trace!(
                        "Summary {} -> {} of {:?} returns {:?} at {:?}",
                        job.fact_in_callee,
                        exit_fact_id,
                        callee,
                        target,
                        ret_site
                    );
                    self.store_and_propagate(ret_site_id, job.source_fact, target_id, caller, ef);
                }
            }
        }
    }

    /// Applies the summaries that changed during the last round to all calls waiting for them.
    fn process_inter_jobs(&mut self) {
        let keys = self.call_worklist.take();
        self.stats.num_relevant_calls += keys.len();

        for key in keys {
            let (entry, callee) = split_ids(key);
            let (entry, callee_id) = (FactId::new(entry), FunctionId::new(callee));
            let callee = self.functions[callee_id.get()].clone();

            for exit in self.icfg.exit_points_of(&callee) {
                let exit_id = self.node_id(exit.clone());
                let summaries = self.summaries_for(callee_id, entry, exit_id);
                if summaries.is_empty() {
                    continue;
                }
                let jobs: Vec<InterPropagationJob> = self.inter_jobs.by_callee(entry, callee_id).cloned().collect();
                debug!(
                    "{} calls of {:?} with {} receive {} summaries via {:?}",
                    jobs.len(),
                    callee,
                    entry,
                    summaries.len(),
                    exit
                );
                for job in &jobs {
                    self.propagate_procedure_summaries(job, &exit, exit_id, &summaries);
                }
            }
        }
    }

    /// Whether jump functions (`setting == false`) or results (`setting == true`) at `node`
    /// must be kept when its function is collected.
    fn keep_information_at(&self, node: &P::Node, setting: bool) -> bool {
        let icfg = self.icfg;
        if icfg.is_exit_inst(node) || icfg.is_start_point(node) {
            return true;
        }
        if icfg.preds_of(node).iter().any(|pred| icfg.is_call_site(pred)) {
            return true;
        }
        let compute_values = self.config.compute_values;
        if (setting || compute_values) && self.problem.is_interesting(node) {
            return true;
        }
        !setting && compute_values && !self.config.gc_mode.is_aggressive()
    }

    fn collect_jump_functions(&mut self) {
        let icfg = self.icfg;
        let functions = &mut self.functions;
        let collectable = self.gc.collectable_functions(|function| {
            let function = functions[function.get()].clone();
            icfg.callers_of(&function)
                .iter()
                .map(|cs| FunctionId::new(functions.get_or_insert(icfg.function_of(cs))))
                .collect()
        });
        if collectable.is_empty() {
            return;
        }

        let mut cleared = 0;
        for &function_id in &collectable {
            let function = self.functions[function_id.get()].clone();
            for node in icfg.all_nodes_of(&function) {
                if self.keep_information_at(&node, false) {
                    continue;
                }
                if let Some(id) = self.nodes.get_or_null(&node) {
                    cleared += self.jump_functions.clear_node(NodeId::new(id));
                }
            }
            self.inter_jobs.purge_callee(function_id);
            self.gc.collected(function_id);
        }

        self.num_live_jump_functions -= cleared;
        self.stats.num_collected_jump_functions += cleared;
        info!(
            "GC: collected {} functions, dropped {} jump functions",
            collectable.len(),
            cleared
        );
    }

    /// Sweeps edge functions no table refers to anymore.
    fn collect_edge_functions(&mut self) {
        self.cache.clear_edge_functions();
        let roots: Vec<EdgeRef> = self
            .jump_functions
            .edge_functions()
            .chain(self.end_summaries.edge_functions())
            .chain(self.inter_jobs.edge_functions())
            .chain(self.worklist.iter().map(|job| job.edge_function))
            .collect();
        let freed = self.edge_functions.collect_garbage(roots);
        debug!("Swept {} edge functions", freed);
    }

    /// Phase II: computes the values of all recorded jump functions.
    fn compute_values(&mut self) {
        info!("Computing values...");
        let mut worklist = Worklist::new(self.config.worklist_order);
        let mut seen: FxHashSet<u64> = FxHashSet::default();
        let mut start_points = BitSet::new(self.nodes.size());

        for job in std::mem::take(&mut self.value_seeds) {
            worklist.push(job);
        }
        while let Some(job) = worklist.pop() {
            self.stats.num_value_jobs += 1;
            self.propagate_value(job, &mut worklist, &mut seen, &mut start_points);
        }
        self.stats.value_worklist_high_watermark = worklist.high_watermark();

        debug!("Evaluating jump functions of {} start points", start_points.len());
        for sp in start_points.iter() {
            self.compute_values_from(NodeId::new(sp as u32));
        }

        self.jump_functions.clear();
        self.end_summaries.clear();
        self.inter_jobs.clear();
        self.num_live_jump_functions = 0;
    }

    /// Joins a value into a start point and forwards it along the calls of that function.
    fn propagate_value(
        &mut self,
        job: ValueJob<P::Value>,
        worklist: &mut Worklist<ValueJob<P::Value>>,
        seen: &mut FxHashSet<u64>,
        start_points: &mut BitSet,
    ) {
        let icfg = self.icfg;
        let stored = self.values.get(job.node, job.fact);
        let joined = stored.join(&job.value);
        let first_visit = seen.insert(combine_ids(job.node.get(), job.fact.get()));
        if !first_visit && joined == stored {
            return;
        }
        trace!("Value at {} for {}: {:?}", job.node, job.fact, joined);
        self.values.set(job.node, job.fact, joined.clone());
        start_points.insert(job.node.index());

        let sp = self.nodes[job.node.get()].clone();
        for call_site in icfg.calls_from_within(&icfg.function_of(&sp)) {
            let Some(cs) = self.nodes.get_or_null(&call_site) else {
                continue;
            };
            let calls: Vec<(EdgeRef, FunctionId, FactId)> = self
                .inter_jobs
                .by_call_site(job.fact, NodeId::new(cs))
                .map(|call| (call.edge_function, call.callee, call.fact_in_callee))
                .collect();
            for (ef, callee, fact_in_callee) in calls {
                let value = self.edge_functions.compute_target(ef, &joined);
                let callee = &self.functions[callee.get()];
                for callee_sp in icfg.start_points_of(callee) {
                    if let Some(node) = self.nodes.get_or_null(&callee_sp) {
                        worklist.push(ValueJob {
                            node: NodeId::new(node),
                            fact: fact_in_callee,
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Evaluates every jump function of the function starting at `sp`.
    fn compute_values_from(&mut self, sp: NodeId) {
        let icfg = self.icfg;
        let sp_node = self.nodes[sp.get()].clone();
        let aggressive = self.config.gc_mode.is_aggressive();

        for node in icfg.all_nodes_of(&icfg.function_of(&sp_node)) {
            if node == sp_node || (aggressive && !self.keep_information_at(&node, true)) {
                continue;
            }
            let Some(id) = self.nodes.get_or_null(&node) else {
                continue;
            };
            let id = NodeId::new(id);
            for (source, target, ef) in self.jump_functions.entries(id) {
                let source_value = self.values.get(sp, source);
                let value = self.edge_functions.compute_target(ef, &source_value);
                let stored = self.values.get(id, target);
                let joined = stored.join(&value);
                if joined != stored || !self.values.contains(id, target) {
                    self.values.set(id, target, joined);
                }
            }
        }
    }

    fn record_stats(&mut self) {
        let stats = &mut self.stats;
        stats.worklist_high_watermark = self.worklist.high_watermark();
        stats.call_worklist_high_watermark = self.call_worklist.high_watermark();
        stats.num_gc_runs = self.gc.num_runs();
        stats.num_collected_functions = self.gc.num_collected();
        stats.num_edge_functions_interned = self.edge_functions.num_interned();
        stats.num_edge_functions_swept = self.edge_functions.num_swept();
        stats.edge_function_cache_hits = self.edge_functions.cache_hits() + self.cache.edge_hits();
        stats.edge_function_cache_misses = self.edge_functions.cache_misses() + self.cache.edge_misses();
        stats.flow_cache_hits = self.cache.flow_hits();
        stats.flow_cache_misses = self.cache.flow_misses();
        stats.num_facts = self.facts.size();
        stats.num_nodes = self.nodes.size();
        stats.num_functions = self.functions.size();
    }
}
