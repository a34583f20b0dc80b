//! Toy analyses over `ExplicitIcfg` shared by the integration tests.

#![allow(dead_code)]

use rustc_hash::{FxHashMap, FxHashSet};

use ide_solver::edge_function::{CustomEdgeFunction, EdgeFunction};
use ide_solver::explicit::ExplicitIcfg;
use ide_solver::flow::FlowFunction;
use ide_solver::lattice::{BinaryDomain, Flat};
use ide_solver::problem::{IdeProblem, IfdsProblem, InitialSeeds};

pub const ZERO: &str = "<zero>";

pub type Var = &'static str;
pub type Value = Flat<i64>;

/// `λv. a*v + b`, strict in top and bottom.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Linear {
    pub a: i64,
    pub b: i64,
}

impl Linear {
    pub fn new(a: i64, b: i64) -> Self {
        Linear { a, b }
    }
}

impl CustomEdgeFunction<Value> for Linear {
    fn compute_target(&self, source: &Value) -> Value {
        match source {
            Flat::Value(x) => Flat::Value(self.a.wrapping_mul(*x).wrapping_add(self.b)),
            other => other.clone(),
        }
    }

    fn compose(&self, second: &Self) -> Option<Self> {
        Some(Linear {
            a: second.a.wrapping_mul(self.a),
            b: second.a.wrapping_mul(self.b).wrapping_add(second.b),
        })
    }

    fn as_constant(&self) -> Option<Value> {
        (self.a == 0).then_some(Flat::Value(self.b))
    }
}

/// Statement attached to a node. Its effect is visible at the node's successors.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `x = c`
    Const(Var, i64),
    /// `dst = a*src + b`
    Assign { dst: Var, src: Var, f: Linear },
    /// `x = <unknown>`
    Kill(Var),
}

/// Parameter passing at one call site: `(caller var, callee var, edge function)` pairs.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub args: Vec<(Var, Var, Linear)>,
    pub rets: Vec<(Var, Var, Linear)>,
}

/// Linear constant propagation.
///
/// Without a [`Binding`], variables are global: they enter every callee unchanged and
/// leave it unchanged, so the call-to-return edge only carries the zero fact.
#[derive(Debug, Clone, Default)]
pub struct LinearConstants {
    pub stmts: FxHashMap<String, Stmt>,
    pub bindings: FxHashMap<String, Binding>,
    /// Call sites whose callee is replaced by `dst = f(src)`, keyed by call site.
    pub summaries: FxHashMap<String, (Var, Var, Linear)>,
    pub seeds: Vec<(String, Var, Value)>,
    pub interesting: FxHashSet<String>,
}

impl LinearConstants {
    pub fn new(entry: &str) -> Self {
        let mut problem = LinearConstants::default();
        problem.seed(entry, ZERO, Flat::Bottom);
        problem
    }

    pub fn seed(&mut self, node: &str, fact: Var, value: Value) -> &mut Self {
        self.seeds.push((node.to_string(), fact, value));
        self
    }

    pub fn stmt(&mut self, node: &str, stmt: Stmt) -> &mut Self {
        self.stmts.insert(node.to_string(), stmt);
        self
    }

    pub fn bind(&mut self, call_site: &str, binding: Binding) -> &mut Self {
        self.bindings.insert(call_site.to_string(), binding);
        self
    }

    pub fn summarize(&mut self, call_site: &str, src: Var, dst: Var, f: Linear) -> &mut Self {
        self.summaries.insert(call_site.to_string(), (src, dst, f));
        self
    }

    pub fn interesting(&mut self, node: &str) -> &mut Self {
        self.interesting.insert(node.to_string());
        self
    }
}

impl IdeProblem for LinearConstants {
    type Node = String;
    type Fact = Var;
    type Function = String;
    type Value = Value;
    type Custom = Linear;

    fn zero_fact(&self) -> Var {
        ZERO
    }

    fn initial_seeds(&self) -> InitialSeeds<String, Var, Value> {
        let mut seeds = InitialSeeds::new();
        for (node, fact, value) in &self.seeds {
            seeds.add_seed(node.clone(), *fact, value.clone());
        }
        seeds
    }

    fn normal_flow_function(&self, curr: &String, _succ: &String) -> FlowFunction<Var> {
        match self.stmts.get(curr) {
            Some(&Stmt::Const(x, _)) => FlowFunction::Transfer { from: ZERO, to: x },
            Some(&Stmt::Assign { dst, src, .. }) => FlowFunction::Transfer { from: src, to: dst },
            Some(&Stmt::Kill(x)) => FlowFunction::Kill(x),
            None => FlowFunction::Identity,
        }
    }

    fn call_flow_function(&self, call_site: &String, _callee: &String) -> FlowFunction<Var> {
        match self.bindings.get(call_site) {
            Some(binding) => FlowFunction::Map(binding.args.iter().map(|&(a, f, _)| (a, f)).collect()),
            None => FlowFunction::Identity,
        }
    }

    fn return_flow_function(&self, call_site: &String, _callee: &String, _exit: &String, _ret_site: &String) -> FlowFunction<Var> {
        match self.bindings.get(call_site) {
            Some(binding) => FlowFunction::Map(binding.rets.iter().map(|&(f, a, _)| (f, a)).collect()),
            None => FlowFunction::Identity,
        }
    }

    fn call_to_return_flow_function(&self, call_site: &String, _ret_site: &String, _callees: &[String]) -> FlowFunction<Var> {
        match self.bindings.get(call_site) {
            Some(binding) => {
                let killed: Vec<Var> = binding.rets.iter().map(|&(_, a, _)| a).collect();
                FlowFunction::lambda(move |d| if killed.contains(d) { vec![] } else { vec![*d] })
            }
            None => FlowFunction::KillAll,
        }
    }

    fn summary_flow_function(&self, call_site: &String, _callee: &String) -> Option<FlowFunction<Var>> {
        self.summaries
            .get(call_site)
            .map(|&(src, dst, _)| FlowFunction::Transfer { from: src, to: dst })
    }

    fn summary_edge_function(&self, call_site: &String, call_fact: &Var, _ret_site: &String, ret_fact: &Var) -> EdgeFunction<Value, Linear> {
        match self.summaries.get(call_site) {
            Some(&(src, dst, f)) if *call_fact == src && *ret_fact == dst => EdgeFunction::Custom(f),
            _ => EdgeFunction::Identity,
        }
    }

    fn normal_edge_function(&self, curr: &String, curr_fact: &Var, _succ: &String, succ_fact: &Var) -> EdgeFunction<Value, Linear> {
        match self.stmts.get(curr) {
            Some(&Stmt::Const(x, c)) if *curr_fact == ZERO && *succ_fact == x => EdgeFunction::Constant(Flat::Value(c)),
            Some(&Stmt::Assign { dst, src, f }) if *curr_fact == src && *succ_fact == dst => EdgeFunction::Custom(f),
            _ => EdgeFunction::Identity,
        }
    }

    fn call_edge_function(&self, call_site: &String, src_fact: &Var, _callee: &String, dest_fact: &Var) -> EdgeFunction<Value, Linear> {
        self.bindings
            .get(call_site)
            .and_then(|b| b.args.iter().find(|&&(a, f, _)| a == *src_fact && f == *dest_fact))
            .map_or(EdgeFunction::Identity, |&(_, _, lin)| EdgeFunction::Custom(lin))
    }

    fn return_edge_function(
        &self,
        call_site: &String,
        _callee: &String,
        _exit: &String,
        exit_fact: &Var,
        _ret_site: &String,
        ret_fact: &Var,
    ) -> EdgeFunction<Value, Linear> {
        self.bindings
            .get(call_site)
            .and_then(|b| b.rets.iter().find(|&&(f, a, _)| f == *exit_fact && a == *ret_fact))
            .map_or(EdgeFunction::Identity, |&(_, _, lin)| EdgeFunction::Custom(lin))
    }

    fn is_interesting(&self, node: &String) -> bool {
        self.interesting.contains(node)
    }
}

/// Reachability of generated facts. Facts are global, like in [`LinearConstants`].
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    pub entry: String,
    pub gens: FxHashMap<String, Vec<Var>>,
    pub kills: FxHashMap<String, Vec<Var>>,
}

impl Reachability {
    pub fn new(entry: &str) -> Self {
        Reachability {
            entry: entry.to_string(),
            ..Default::default()
        }
    }

    pub fn gen(&mut self, node: &str, fact: Var) -> &mut Self {
        self.gens.entry(node.to_string()).or_default().push(fact);
        self
    }

    pub fn kill(&mut self, node: &str, fact: Var) -> &mut Self {
        self.kills.entry(node.to_string()).or_default().push(fact);
        self
    }
}

impl IfdsProblem for Reachability {
    type Node = String;
    type Fact = Var;
    type Function = String;

    fn zero_fact(&self) -> Var {
        ZERO
    }

    fn initial_seeds(&self) -> InitialSeeds<String, Var, BinaryDomain> {
        let mut seeds = InitialSeeds::new();
        seeds.add_fact(self.entry.clone(), ZERO);
        seeds
    }

    fn normal_flow_function(&self, curr: &String, _succ: &String) -> FlowFunction<Var> {
        let gen = match self.gens.get(curr) {
            Some(facts) => FlowFunction::gen(ZERO, facts.iter().copied()),
            None => FlowFunction::Identity,
        };
        match self.kills.get(curr) {
            Some(killed) => {
                let killed = killed.clone();
                let gen = std::rc::Rc::new(gen);
                FlowFunction::lambda(move |d| {
                    gen.compute_targets(d)
                        .into_iter()
                        .filter(|t| !killed.contains(t))
                        .collect()
                })
            }
            None => gen,
        }
    }

    fn call_flow_function(&self, _: &String, _: &String) -> FlowFunction<Var> {
        FlowFunction::Identity
    }

    fn return_flow_function(&self, _: &String, _: &String, _: &String, _: &String) -> FlowFunction<Var> {
        FlowFunction::Identity
    }

    fn call_to_return_flow_function(&self, _: &String, _: &String, _: &[String]) -> FlowFunction<Var> {
        FlowFunction::KillAll
    }
}

/// main: `x = 1; y = 2*x + 3; call inc; use; exit`, inc: `x = x + 1; ret`.
pub fn call_program() -> (ExplicitIcfg, LinearConstants) {
    let mut icfg = ExplicitIcfg::new();
    icfg.add_function("main", &["m0", "m1", "m2", "m3", "m4"]);
    icfg.add_function("inc", &["i0", "i1"]);
    icfg.add_chain(&["m0", "m1", "m2", "m3", "m4"]);
    icfg.add_chain(&["i0", "i1"]);
    icfg.add_call("m2", "inc");

    let mut problem = LinearConstants::new("m0");
    problem
        .stmt("m0", Stmt::Const("x", 1))
        .stmt("m1", Stmt::Assign { dst: "y", src: "x", f: Linear::new(2, 3) })
        .stmt("i0", Stmt::Assign { dst: "x", src: "x", f: Linear::new(1, 1) });
    (icfg, problem)
}

/// Three functions where `leaf` is called twice with different constants, and `unused`
/// is never called. Exercises summary reuse and GC of finished callees.
pub fn multi_call_program() -> (ExplicitIcfg, LinearConstants) {
    let mut icfg = ExplicitIcfg::new();
    icfg.add_function("main", &["m0", "m1", "m2", "m3", "m4", "m5", "m6"]);
    icfg.add_function("mid", &["d0", "d1", "d2", "d3"]);
    icfg.add_function("leaf", &["l0", "l1", "l2"]);
    icfg.add_function("unused", &["u0", "u1"]);
    icfg.add_chain(&["m0", "m1", "m2", "m3", "m4", "m5", "m6"]);
    icfg.add_chain(&["d0", "d1", "d2", "d3"]);
    icfg.add_chain(&["l0", "l1", "l2"]);
    icfg.add_chain(&["u0", "u1"]);
    icfg.add_call("m1", "mid");
    icfg.add_call("m4", "leaf");
    icfg.add_call("d1", "leaf");

    let mut problem = LinearConstants::new("m0");
    problem
        .stmt("m0", Stmt::Const("a", 10))
        .stmt("m2", Stmt::Assign { dst: "c", src: "b", f: Linear::new(1, 0) })
        .stmt("m3", Stmt::Const("a", 20))
        .stmt("m5", Stmt::Kill("a"))
        .stmt("d0", Stmt::Assign { dst: "a", src: "a", f: Linear::new(1, 5) })
        .stmt("d2", Stmt::Const("t", 7))
        .stmt("l0", Stmt::Assign { dst: "b", src: "a", f: Linear::new(3, 0) })
        .stmt("l1", Stmt::Kill("t"))
        .interesting("m6");
    (icfg, problem)
}

/// Collects all result entries, sorted, for comparisons between runs.
pub fn entries<VC>(
    results: &ide_solver::results::SolverResults<String, Var, Value, VC>,
) -> Vec<(String, Var, Value)>
where
    VC: ide_solver::compressor::Compress<Value> + Default,
{
    let mut all = Vec::new();
    results.for_each_result_entry(|node, fact, value| all.push((node.clone(), *fact, value.clone())));
    all.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
    all
}
