//! Solver configuration.

/// Jump-function garbage collection policy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum GcMode {
    /// Keep every jump function until the end of the fact-propagation phase.
    #[default]
    Disabled,
    /// Drop jump functions of finished procedures, except where results or summaries need them.
    ///
    /// In IDE mode every jump function is still needed by value computation, so a collected
    /// procedure only loses the by-callee links of its inter-procedural jobs. Reachability-only
    /// runs (`compute_values == false`) drop the jump functions of intermediate nodes.
    Enabled,
    /// Like `Enabled`, but results are only kept at start points, exit points, return sites
    /// and nodes the problem marks as interesting.
    ///
    /// This changes what `SolverResults` reports: entries at other nodes are missing.
    EnabledAggressively,
}

impl GcMode {
    pub fn is_enabled(self) -> bool {
        self != GcMode::Disabled
    }

    pub fn is_aggressive(self) -> bool {
        self == GcMode::EnabledAggressively
    }
}

/// Order in which pending propagation jobs are processed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WorklistOrder {
    /// Depth-first: most recently discovered job first.
    #[default]
    Lifo,
    /// Breadth-first.
    Fifo,
}

/// Configuration of an [`IdeSolver`][crate::solver::IdeSolver].
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Run the value-computation phase. `false` solves the plain IFDS reachability problem.
    pub compute_values: bool,
    pub gc_mode: GcMode,
    /// Keep a `(function, entry fact) -> exit facts` table instead of scanning exit nodes.
    pub use_end_summary_tab: bool,
    /// Make every flow function map the zero fact to itself.
    pub auto_add_zero: bool,
    pub worklist_order: WorklistOrder,
    /// Maximal number of non-constant operands of an interned join.
    pub join_limit: usize,
    /// Sweep unreachable edge functions after GC rounds and after fact propagation.
    pub collect_edge_functions: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            compute_values: true,
            gc_mode: GcMode::Disabled,
            use_end_summary_tab: true,
            auto_add_zero: true,
            worklist_order: WorklistOrder::Lifo,
            join_limit: 8,
            collect_edge_functions: true,
        }
    }
}

impl SolverConfig {
    pub fn with_compute_values(mut self, compute_values: bool) -> Self {
        self.compute_values = compute_values;
        self
    }

    pub fn with_gc_mode(mut self, gc_mode: GcMode) -> Self {
        self.gc_mode = gc_mode;
        self
    }

    pub fn with_end_summary_tab(mut self, use_end_summary_tab: bool) -> Self {
        self.use_end_summary_tab = use_end_summary_tab;
        self
    }

    pub fn with_auto_add_zero(mut self, auto_add_zero: bool) -> Self {
        self.auto_add_zero = auto_add_zero;
        self
    }

    pub fn with_worklist_order(mut self, worklist_order: WorklistOrder) -> Self {
        self.worklist_order = worklist_order;
        self
    }

    pub fn with_join_limit(mut self, join_limit: usize) -> Self {
        self.join_limit = join_limit;
        self
    }

    pub fn with_collect_edge_functions(mut self, collect_edge_functions: bool) -> Self {
        self.collect_edge_functions = collect_edge_functions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert!(config.compute_values);
        assert_eq!(config.gc_mode, GcMode::Disabled);
        assert!(config.use_end_summary_tab);
        assert!(config.auto_add_zero);
        assert_eq!(config.worklist_order, WorklistOrder::Lifo);
        assert_eq!(config.join_limit, 8);
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::default()
            .with_compute_values(false)
            .with_gc_mode(GcMode::EnabledAggressively)
            .with_worklist_order(WorklistOrder::Fifo)
            .with_join_limit(3);
        assert!(!config.compute_values);
        assert!(config.gc_mode.is_enabled());
        assert!(config.gc_mode.is_aggressive());
        assert_eq!(config.worklist_order, WorklistOrder::Fifo);
        assert_eq!(config.join_limit, 3);
        assert!(!GcMode::Disabled.is_enabled());
    }
}
