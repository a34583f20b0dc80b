use std::fmt::Write as _;

use clap::{Parser, ValueEnum};
use log::info;
use rustc_hash::FxHashMap;

use ide_solver::config::{GcMode, SolverConfig, WorklistOrder};
use ide_solver::edge_function::{CustomEdgeFunction, EdgeFunction};
use ide_solver::explicit::ExplicitIcfg;
use ide_solver::flow::FlowFunction;
use ide_solver::lattice::Flat;
use ide_solver::problem::{IdeProblem, InitialSeeds};
use ide_solver::solver::IdeSolver;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Length of the call chain `main -> f0 -> f1 -> ...`.
    #[arg(value_name = "INT", default_value = "4")]
    depth: usize,

    /// Jump-function garbage collection.
    #[clap(long, value_enum, default_value = "disabled")]
    gc: Gc,

    /// Process propagation jobs breadth-first.
    #[clap(long)]
    fifo: bool,

    /// Only compute reachable facts, skip values.
    #[clap(long)]
    ifds: bool,

    /// Print every result entry.
    #[clap(long)]
    dump: bool,

    /// Log level.
    #[clap(long, default_value = "info")]
    log: simplelog::LevelFilter,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Gc {
    Disabled,
    Enabled,
    Aggressive,
}

impl From<Gc> for GcMode {
    fn from(gc: Gc) -> Self {
        match gc {
            Gc::Disabled => GcMode::Disabled,
            Gc::Enabled => GcMode::Enabled,
            Gc::Aggressive => GcMode::EnabledAggressively,
        }
    }
}

type Var = &'static str;
type Value = Flat<i64>;

const ZERO: Var = "0";

/// `λv. a*v + b`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct Affine {
    a: i64,
    b: i64,
}

impl CustomEdgeFunction<Value> for Affine {
    fn compute_target(&self, source: &Value) -> Value {
        match source {
            Flat::Value(x) => Flat::Value(self.a.wrapping_mul(*x).wrapping_add(self.b)),
            other => other.clone(),
        }
    }

    fn compose(&self, second: &Self) -> Option<Self> {
        Some(Affine {
            a: second.a.wrapping_mul(self.a),
            b: second.a.wrapping_mul(self.b).wrapping_add(second.b),
        })
    }

    fn as_constant(&self) -> Option<Value> {
        (self.a == 0).then_some(Flat::Value(self.b))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stmt {
    /// `x = c`
    Const(Var, i64),
    /// `dst = a*src + b`
    Assign(Var, Var, Affine),
}

/// Linear constant propagation over global variables.
#[derive(Debug, Default)]
struct Constants {
    entry: String,
    stmts: FxHashMap<String, Stmt>,
}

impl IdeProblem for Constants {
    type Node = String;
    type Fact = Var;
    type Function = String;
    type Value = Value;
    type Custom = Affine;

    fn zero_fact(&self) -> Var {
        ZERO
    }

    fn initial_seeds(&self) -> InitialSeeds<String, Var, Value> {
        let mut seeds = InitialSeeds::new();
        seeds.add_fact(self.entry.clone(), ZERO);
        seeds
    }

    fn normal_flow_function(&self, curr: &String, _succ: &String) -> FlowFunction<Var> {
        match self.stmts.get(curr) {
            Some(&Stmt::Const(x, _)) => FlowFunction::Transfer { from: ZERO, to: x },
            Some(&Stmt::Assign(dst, src, _)) => FlowFunction::Transfer { from: src, to: dst },
            None => FlowFunction::Identity,
        }
    }

    fn call_flow_function(&self, _call_site: &String, _callee: &String) -> FlowFunction<Var> {
        FlowFunction::Identity
    }

    fn return_flow_function(
        &self,
        _call_site: &String,
        _callee: &String,
        _exit: &String,
        _ret_site: &String,
    ) -> FlowFunction<Var> {
        FlowFunction::Identity
    }

    fn call_to_return_flow_function(
        &self,
        _call_site: &String,
        _ret_site: &String,
        _callees: &[String],
    ) -> FlowFunction<Var> {
        FlowFunction::KillAll
    }

    fn normal_edge_function(
        &self,
        curr: &String,
        curr_fact: &Var,
        _succ: &String,
        succ_fact: &Var,
    ) -> EdgeFunction<Value, Affine> {
        match self.stmts.get(curr) {
            Some(&Stmt::Const(x, c)) if *curr_fact == ZERO && *succ_fact == x => {
                EdgeFunction::Constant(Flat::Value(c))
            }
            Some(&Stmt::Assign(dst, src, f)) if *curr_fact == src && *succ_fact == dst => EdgeFunction::Custom(f),
            _ => EdgeFunction::Identity,
        }
    }
}

/// Builds `main`, which calls `f0` twice, and the chain `f0 -> f1 -> ... -> f{depth-1}`.
///
/// Every `fi` increments `x` and copies `3*x` into `y`, so `x` is precise after each call of
/// `f0` while `y` inside the chain joins two contexts.
fn build_program(depth: usize) -> (ExplicitIcfg, Constants) {
    let mut icfg = ExplicitIcfg::new();
    let mut problem = Constants {
        entry: "main.0".to_string(),
        ..Default::default()
    };

    let main: Vec<String> = (0..6).map(|i| format!("main.{}", i)).collect();
    let main: Vec<&str> = main.iter().map(String::as_str).collect();
    icfg.add_function("main", &main);
    icfg.add_chain(&main);
    problem.stmts.insert("main.0".to_string(), Stmt::Const("x", 1));
    problem
        .stmts
        .insert("main.2".to_string(), Stmt::Assign("z", "x", Affine { a: 1, b: 0 }));

    for i in 0..depth {
        let nodes: Vec<String> = (0..4).map(|j| format!("f{}.{}", i, j)).collect();
        let nodes: Vec<&str> = nodes.iter().map(String::as_str).collect();
        icfg.add_function(&format!("f{}", i), &nodes);
        icfg.add_chain(&nodes);
        problem
            .stmts
            .insert(nodes[0].to_string(), Stmt::Assign("x", "x", Affine { a: 1, b: 1 }));
        problem
            .stmts
            .insert(nodes[2].to_string(), Stmt::Assign("y", "x", Affine { a: 3, b: 0 }));
    }
    for i in 1..depth {
        icfg.add_call(&format!("f{}.1", i - 1), &format!("f{}", i));
    }
    if depth > 0 {
        icfg.add_call("main.1", "f0");
        icfg.add_call("main.3", "f0");
    }

    (icfg, problem)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let (icfg, problem) = build_program(args.depth);
    let config = SolverConfig::default()
        .with_gc_mode(args.gc.into())
        .with_compute_values(!args.ifds)
        .with_worklist_order(if args.fifo { WorklistOrder::Fifo } else { WorklistOrder::Lifo });
    info!("config = {:?}", config);

    let results = IdeSolver::new(&problem, &icfg, config).solve();

    for var in ["x", "y", "z"] {
        println!("{} at main.5 = {}", var, results.result_at(&"main.5".to_string(), &var));
    }
    if args.depth > 0 {
        println!("x at main.2 = {}", results.result_at(&"main.2".to_string(), &"x"));
    }

    if args.dump {
        let mut out = String::new();
        results.dump(&icfg, &mut out)?;
        print!("{}", out);
    }
    print!("{}", results.stats());

    println!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
