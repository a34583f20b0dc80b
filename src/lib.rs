//! # ide-solver: summary-based IFDS/IDE tabulation in Rust
//!
//! **`ide-solver`** is a generic interprocedural data-flow analysis engine.
//! Given an interprocedural control-flow graph ([`Icfg`][crate::icfg::Icfg]) and a client analysis
//! ([`IdeProblem`][crate::problem::IdeProblem]: flow functions, edge functions and a join lattice),
//! it computes the set of data-flow facts holding at every reachable program point and, in IDE mode,
//! a lattice value attached to each of those facts.
//!
//! ## How it works
//!
//! The solver follows the iterative tabulation scheme of Naeem, Lhoták and Rodriguez:
//!
//! 1. **Fact propagation.** Path edges ("jump functions") are propagated through the ICFG by a worklist.
//!    Calls register an inter-procedural job and are resumed in rounds, once callee summaries are known.
//! 2. **Value computation** (IDE only). Seed values are pushed through call sites into callee start points,
//!    then every jump function is evaluated against the value at its start point.
//!
//! ## Key Features
//!
//! - **Flyweight identities**: nodes, facts and functions are interned by a [`Compressor`][crate::compressor::Compressor]
//!   and handled as dense `u32` ids everywhere in the hot path.
//! - **Hash-consed edge functions**: all edge functions live in one [`EdgeFunctions`][crate::edge_functions::EdgeFunctions]
//!   manager and are referred to by lightweight [`EdgeRef`][crate::edge_functions::EdgeRef] handles.
//!   Structurally equal functions share one handle, so "did the join change anything" is a handle comparison.
//! - **Memoization**: flow and edge functions are requested from the client at most once per edge.
//! - **Jump-function GC**: optionally drops the jump functions of finished procedures between rounds.
//!
//! ## Basic Usage
//!
//! ```rust
//! use ide_solver::explicit::ExplicitIcfg;
//! use ide_solver::flow::FlowFunction;
//! use ide_solver::lattice::BinaryDomain;
//! use ide_solver::problem::{IfdsAdapter, IfdsProblem, InitialSeeds};
//! use ide_solver::solver::IdeSolver;
//! use ide_solver::config::SolverConfig;
//!
//! struct Reach;
//!
//! impl IfdsProblem for Reach {
//!     type Node = String;
//!     type Fact = u32;
//!     type Function = String;
//!
//!     fn zero_fact(&self) -> u32 { 0 }
//!     fn initial_seeds(&self) -> InitialSeeds<String, u32, BinaryDomain> {
//!         let mut seeds = InitialSeeds::new();
//!         seeds.add_fact("a".to_string(), 0);
//!         seeds
//!     }
//!     fn normal_flow_function(&self, curr: &String, _succ: &String) -> FlowFunction<u32> {
//!         if curr == "a" { FlowFunction::gen(0, [7]) } else { FlowFunction::Identity }
//!     }
//!     fn call_flow_function(&self, _: &String, _: &String) -> FlowFunction<u32> { FlowFunction::Identity }
//!     fn return_flow_function(&self, _: &String, _: &String, _: &String, _: &String) -> FlowFunction<u32> {
//!         FlowFunction::Identity
//!     }
//!     fn call_to_return_flow_function(&self, _: &String, _: &String, _: &[String]) -> FlowFunction<u32> {
//!         FlowFunction::Identity
//!     }
//! }
//!
//! let mut icfg = ExplicitIcfg::new();
//! icfg.add_function("main", &["a", "b"]);
//! icfg.add_chain(&["a", "b"]);
//!
//! let problem = IfdsAdapter::new(&Reach);
//! let config = SolverConfig::default().with_compute_values(false);
//! let results = IdeSolver::new(&problem, &icfg, config).solve();
//!
//! let facts = results.ifds_results_at(&"b".to_string());
//! assert!(facts.contains(&0));
//! assert!(facts.contains(&7));
//! ```
//!
//! ## Core Components
//!
//! - **[`solver`]**: the [`IdeSolver`][crate::solver::IdeSolver] driver and both solver phases.
//! - **[`edge_functions`]**: the edge-function manager (interning, compose, join, garbage collection).
//! - **[`problem`]** and **[`icfg`]**: the capabilities a client implements.
//! - **[`results`]**: the read-only [`SolverResults`][crate::results::SolverResults] facade.

pub mod bitset;
pub mod cache;
pub mod compressor;
pub mod config;
pub mod edge_function;
pub mod edge_functions;
pub mod explicit;
pub mod flow;
pub mod flow_cache;
pub mod gc;
pub mod icfg;
pub mod inter_jobs;
pub mod jump_functions;
pub mod lattice;
pub mod problem;
pub mod results;
pub mod singleton;
pub mod solver;
pub mod stats;
pub mod types;
pub mod worklist;
