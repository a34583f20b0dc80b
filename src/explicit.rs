//! Adjacency-list ICFG.
//!
//! [`ExplicitIcfg`] is a small, fully explicit [`Icfg`] with string-named nodes and
//! functions. It is meant for tests, demos and prototyping analyses before wiring up a
//! real program representation.
//!
//! ```
//! use ide_solver::explicit::ExplicitIcfg;
//! use ide_solver::icfg::Icfg;
//!
//! let mut icfg = ExplicitIcfg::new();
//! icfg.add_function("main", &["m0", "m1", "m2"]);
//! icfg.add_function("foo", &["f0", "f1"]);
//! icfg.add_chain(&["m0", "m1", "m2"]);
//! icfg.add_chain(&["f0", "f1"]);
//! icfg.add_call("m1", "foo");
//!
//! assert!(icfg.is_call_site(&"m1".to_string()));
//! assert_eq!(icfg.return_sites_of_call_at(&"m1".to_string()), vec!["m2".to_string()]);
//! assert_eq!(icfg.callers_of(&"foo".to_string()), vec!["m1".to_string()]);
//! ```

use rustc_hash::FxHashMap;

use crate::icfg::Icfg;

#[derive(Debug, Clone)]
struct FunctionInfo {
    name: String,
    nodes: Vec<String>,
    start_points: Vec<String>,
    exit_points: Vec<String>,
    callers: Vec<String>,
    calls: Vec<String>,
}

#[derive(Debug, Clone)]
struct NodeInfo {
    function: usize,
    succs: Vec<String>,
    preds: Vec<String>,
    callees: Vec<String>,
    is_start: bool,
    is_exit: bool,
}

/// Explicitly constructed ICFG over string names.
#[derive(Debug, Clone, Default)]
pub struct ExplicitIcfg {
    functions: Vec<FunctionInfo>,
    function_index: FxHashMap<String, usize>,
    nodes: FxHashMap<String, NodeInfo>,
    num_call_sites: usize,
}

impl ExplicitIcfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function with the given nodes.
    ///
    /// The first node becomes the start point and the last one the exit point.
    /// Edges are added separately.
    pub fn add_function(&mut self, name: &str, nodes: &[&str]) {
        assert!(
            !self.function_index.contains_key(name),
            "Function '{}' already exists",
            name
        );
        let index = self.functions.len();
        self.function_index.insert(name.to_string(), index);
        self.functions.push(FunctionInfo {
            name: name.to_string(),
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            start_points: nodes.first().map(|n| n.to_string()).into_iter().collect(),
            exit_points: nodes.last().map(|n| n.to_string()).into_iter().collect(),
            callers: Vec::new(),
            calls: Vec::new(),
        });
        for (i, &node) in nodes.iter().enumerate() {
            assert!(!self.nodes.contains_key(node), "Node '{}' already exists", node);
            self.nodes.insert(
                node.to_string(),
                NodeInfo {
                    function: index,
                    succs: Vec::new(),
                    preds: Vec::new(),
                    callees: Vec::new(),
                    is_start: i == 0,
                    is_exit: i + 1 == nodes.len(),
                },
            );
        }
    }

    /// Adds a function without a body.
    pub fn add_declaration(&mut self, name: &str) {
        self.add_function(name, &[]);
    }

    /// Marks an additional exit point.
    pub fn add_exit_point(&mut self, node: &str) {
        let info = self.node_mut(node);
        if info.is_exit {
            return;
        }
        info.is_exit = true;
        let function = info.function;
        self.functions[function].exit_points.push(node.to_string());
    }

    /// Adds an intraprocedural edge.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from_fn = self.node(from).function;
        let to_fn = self.node(to).function;
        assert_eq!(
            from_fn, to_fn,
            "Edge {} -> {} crosses functions; use add_call",
            from, to
        );
        let succs = &mut self.node_mut(from).succs;
        if !succs.iter().any(|s| s == to) {
            succs.push(to.to_string());
        }
        let preds = &mut self.node_mut(to).preds;
        if !preds.iter().any(|p| p == from) {
            preds.push(from.to_string());
        }
    }

    /// Adds edges between consecutive nodes.
    pub fn add_chain(&mut self, nodes: &[&str]) {
        for pair in nodes.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
    }

    /// Makes `call_site` a call of `callee`. Its return sites are its successors.
    pub fn add_call(&mut self, call_site: &str, callee: &str) {
        let callee_index = match self.function_index.get(callee) {
            Some(&index) => index,
            None => panic!("Unknown callee '{}'", callee),
        };
        let info = self.node_mut(call_site);
        if info.callees.iter().any(|c| c == callee) {
            return;
        }
        let first_callee = info.callees.is_empty();
        info.callees.push(callee.to_string());
        let caller_index = info.function;

        if first_callee {
            self.num_call_sites += 1;
            self.functions[caller_index].calls.push(call_site.to_string());
        }
        self.functions[callee_index].callers.push(call_site.to_string());
    }

    /// Name of the function owning `node`.
    pub fn function_name_of(&self, node: &str) -> &str {
        &self.functions[self.node(node).function].name
    }

    fn node(&self, node: &str) -> &NodeInfo {
        match self.nodes.get(node) {
            Some(info) => info,
            None => panic!("Unknown node '{}'", node),
        }
    }

    fn node_mut(&mut self, node: &str) -> &mut NodeInfo {
        match self.nodes.get_mut(node) {
            Some(info) => info,
            None => panic!("Unknown node '{}'", node),
        }
    }

    fn function(&self, function: &str) -> &FunctionInfo {
        match self.function_index.get(function) {
            Some(&index) => &self.functions[index],
            None => panic!("Unknown function '{}'", function),
        }
    }
}

impl Icfg for ExplicitIcfg {
    type Node = String;
    type Function = String;

    fn succs_of(&self, node: &String) -> Vec<String> {
        self.node(node).succs.clone()
    }

    fn preds_of(&self, node: &String) -> Vec<String> {
        self.node(node).preds.clone()
    }

    fn is_call_site(&self, node: &String) -> bool {
        !self.node(node).callees.is_empty()
    }

    fn callees_of_call_at(&self, node: &String) -> Vec<String> {
        self.node(node).callees.clone()
    }

    fn return_sites_of_call_at(&self, node: &String) -> Vec<String> {
        self.node(node).succs.clone()
    }

    fn start_points_of(&self, function: &String) -> Vec<String> {
        self.function(function).start_points.clone()
    }

    fn exit_points_of(&self, function: &String) -> Vec<String> {
        self.function(function).exit_points.clone()
    }

    fn is_exit_inst(&self, node: &String) -> bool {
        self.node(node).is_exit
    }

    fn is_start_point(&self, node: &String) -> bool {
        self.node(node).is_start
    }

    fn function_of(&self, node: &String) -> String {
        self.functions[self.node(node).function].name.clone()
    }

    fn callers_of(&self, function: &String) -> Vec<String> {
        self.function(function).callers.clone()
    }

    fn num_call_sites(&self) -> usize {
        self.num_call_sites
    }

    fn all_functions(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.name.clone()).collect()
    }

    fn all_nodes_of(&self, function: &String) -> Vec<String> {
        self.function(function).nodes.clone()
    }

    fn calls_from_within(&self, function: &String) -> Vec<String> {
        self.function(function).calls.clone()
    }
}
