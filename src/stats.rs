//! Solver statistics.

use std::fmt;

/// Counters collected during one `solve()`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SolverStats {
    /// Jump functions created (including refinements that re-enqueued a job).
    pub num_path_edges: usize,
    /// Jump functions alive at the peak.
    pub path_edges_high_watermark: usize,
    pub worklist_high_watermark: usize,
    pub call_worklist_high_watermark: usize,
    /// Fact-propagation rounds (worklist drain plus inter-job reconciliation).
    pub num_rounds: usize,
    /// `(entry fact, callee)` pairs revisited during reconciliation.
    pub num_relevant_calls: usize,
    pub num_inter_jobs: usize,
    pub num_inter_jobs_deduplicated: usize,
    pub num_end_summaries: usize,
    pub num_gc_runs: usize,
    pub num_collected_functions: usize,
    pub num_collected_jump_functions: usize,
    pub num_edge_functions_interned: usize,
    pub num_edge_functions_swept: usize,
    pub edge_function_cache_hits: usize,
    pub edge_function_cache_misses: usize,
    pub flow_cache_hits: usize,
    pub flow_cache_misses: usize,
    pub num_value_jobs: usize,
    pub value_worklist_high_watermark: usize,
    pub num_facts: usize,
    pub num_nodes: usize,
    pub num_functions: usize,
}

impl SolverStats {
    /// Counts a new jump function, tracking the peak of `alive`.
    pub fn path_edge_created(&mut self, alive: usize) {
        self.num_path_edges += 1;
        self.path_edges_high_watermark = self.path_edges_high_watermark.max(alive);
    }
}

impl fmt::Display for SolverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, usize); 23] = [
            ("path edges", self.num_path_edges),
            ("path edges (peak)", self.path_edges_high_watermark),
            ("worklist (peak)", self.worklist_high_watermark),
            ("call worklist (peak)", self.call_worklist_high_watermark),
            ("rounds", self.num_rounds),
            ("relevant calls", self.num_relevant_calls),
            ("inter jobs", self.num_inter_jobs),
            ("inter jobs deduplicated", self.num_inter_jobs_deduplicated),
            ("end summaries", self.num_end_summaries),
            ("GC runs", self.num_gc_runs),
            ("collected functions", self.num_collected_functions),
            ("collected jump functions", self.num_collected_jump_functions),
            ("edge functions interned", self.num_edge_functions_interned),
            ("edge functions swept", self.num_edge_functions_swept),
            ("edge function cache hits", self.edge_function_cache_hits),
            ("edge function cache misses", self.edge_function_cache_misses),
            ("flow cache hits", self.flow_cache_hits),
            ("flow cache misses", self.flow_cache_misses),
            ("value jobs", self.num_value_jobs),
            ("value worklist (peak)", self.value_worklist_high_watermark),
            ("facts", self.num_facts),
            ("nodes", self.num_nodes),
            ("functions", self.num_functions),
        ];
        writeln!(f, "Solver statistics:")?;
        for (name, value) in rows {
            writeln!(f, "  {:<28} {:>10}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_edge_peak() {
        let mut stats = SolverStats::default();
        stats.path_edge_created(1);
        stats.path_edge_created(5);
        stats.path_edge_created(3);
        assert_eq!(stats.num_path_edges, 3);
        assert_eq!(stats.path_edges_high_watermark, 5);
    }

    #[test]
    fn test_display() {
        let stats = SolverStats {
            num_rounds: 4,
            ..Default::default()
        };
        let text = stats.to_string();
        println!("{}", text);
        assert!(text.starts_with("Solver statistics:"));
        assert!(text.lines().any(|l| l.contains("rounds") && l.trim_end().ends_with('4')));
    }
}
