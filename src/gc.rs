//! Jump-function garbage collection bookkeeping.
//!
//! Every jump function created on behalf of a function bumps that function's reference
//! count; processing the corresponding job drops it again. Between rounds, functions with
//! a zero count that cannot be re-entered from a live function are reported as collectable.

use log::debug;

use crate::bitset::BitSet;
use crate::types::FunctionId;

#[derive(Debug, Clone, Default)]
pub struct JumpFunctionGc {
    ref_counts: Vec<usize>,
    candidates: BitSet,
    num_runs: usize,
    num_collected: usize,
}

impl JumpFunctionGc {
    pub fn new(num_functions: usize) -> Self {
        Self {
            ref_counts: vec![0; num_functions],
            candidates: BitSet::new(num_functions),
            num_runs: 0,
            num_collected: 0,
        }
    }

    /// A job owned by `function` was enqueued.
    pub fn retain(&mut self, function: FunctionId) {
        let i = function.index();
        if i >= self.ref_counts.len() {
            self.ref_counts.resize(i + 1, 0);
        }
        self.ref_counts[i] += 1;
        self.candidates.insert(i);
    }

    /// A job owned by `function` was processed.
    pub fn release(&mut self, function: FunctionId) {
        match self.ref_counts.get_mut(function.index()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => panic!("Releasing {} without pending jobs", function),
        }
    }

    pub fn ref_count(&self, function: FunctionId) -> usize {
        self.ref_counts.get(function.index()).copied().unwrap_or(0)
    }

    /// True if no function has pending jobs.
    pub fn all_released(&self) -> bool {
        self.ref_counts.iter().all(|&c| c == 0)
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Computes the candidates that may be collected now.
    ///
    /// A candidate with pending jobs keeps all its transitive callers alive, since those
    /// may still receive summaries from it. `callers_of` maps a function to the functions
    /// containing its call sites.
    pub fn collectable_functions(
        &mut self,
        mut callers_of: impl FnMut(FunctionId) -> Vec<FunctionId>,
    ) -> Vec<FunctionId> {
        self.num_runs += 1;

        let mut worklist: Vec<FunctionId> = Vec::new();
        let mut collectable = BitSet::new(self.candidates.capacity());

        for c in self.candidates.iter() {
            if self.ref_counts.get(c).copied().unwrap_or(0) > 0 {
                worklist.extend(callers_of(FunctionId::new(c as u32)));
            } else {
                collectable.insert(c);
            }
        }

        while let Some(function) = worklist.pop() {
            if !collectable.remove(function.index()) {
                continue;
            }
            worklist.extend(callers_of(function));
        }

        debug!(
            "{} of {} GC candidates are collectable",
            collectable.len(),
            self.candidates.len()
        );
        collectable.iter().map(|i| FunctionId::new(i as u32)).collect()
    }

    /// Marks `function` as collected.
    pub fn collected(&mut self, function: FunctionId) {
        self.candidates.remove(function.index());
        self.num_collected += 1;
    }

    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    pub fn num_collected(&self) -> usize {
        self.num_collected
    }
}
