//! Ledger of interprocedural propagation jobs.
//!
//! Every time a fact flows into a callee, the solver records an [`InterPropagationJob`]:
//! "call site `cs`, reached from entry fact `source_fact` with edge function `ef`, passes
//! `fact_in_callee` into `callee`". Jobs are deduplicated by content and live in one arena.
//!
//! Two intrusive singly linked lists thread through the arena:
//!
//! - **by callee**, keyed `(fact_in_callee, callee)`: which call sites wait for a summary of
//!   this callee entered with this fact;
//! - **by call site**, keyed `(source_fact, call_site)`: which callee entries a value arriving
//!   at the caller's start point must be forwarded to.
//!
//! Links are arena indices, never references.

use rustc_hash::FxHashMap;

use crate::edge_functions::EdgeRef;
use crate::types::{combine_ids, FactId, FunctionId, NodeId};

/// Index of a job in the ledger's arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct JobIdx(u32);

impl JobIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct JobKey {
    edge_function: EdgeRef,
    source_fact: FactId,
    callee: FunctionId,
    call_site: NodeId,
    fact_in_callee: FactId,
}

#[derive(Debug, Clone)]
pub struct InterPropagationJob {
    /// Edge function from the caller's start point to the callee's entry.
    pub edge_function: EdgeRef,
    /// Entry fact of the caller.
    pub source_fact: FactId,
    pub callee: FunctionId,
    pub call_site: NodeId,
    pub fact_in_callee: FactId,
    next_same_callee: Option<JobIdx>,
    next_same_call_site: Option<JobIdx>,
}

#[derive(Debug, Clone, Default)]
pub struct InterJobLedger {
    jobs: Vec<InterPropagationJob>,
    dedup: FxHashMap<JobKey, JobIdx>,
    by_callee: FxHashMap<u64, JobIdx>,
    by_call_site: FxHashMap<u64, JobIdx>,
}

impl InterJobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a job. Returns its index if it is new, `None` if an equal job exists.
    ///
    /// New jobs are not linked yet; see [`link`][Self::link].
    pub fn insert(
        &mut self,
        edge_function: EdgeRef,
        source_fact: FactId,
        callee: FunctionId,
        call_site: NodeId,
        fact_in_callee: FactId,
    ) -> Option<JobIdx> {
        let key = JobKey {
            edge_function,
            source_fact,
            callee,
            call_site,
            fact_in_callee,
        };
        if self.dedup.contains_key(&key) {
            return None;
        }
        assert!(self.jobs.len() < u32::MAX as usize, "Inter-job arena exhausted");
        let idx = JobIdx(self.jobs.len() as u32);
        self.jobs.push(InterPropagationJob {
            edge_function,
            source_fact,
            callee,
            call_site,
            fact_in_callee,
            next_same_callee: None,
            next_same_call_site: None,
        });
        self.dedup.insert(key, idx);
        Some(idx)
    }

    /// Prepends the job to its by-callee list and, if `forward`, to its by-call-site list.
    pub fn link(&mut self, idx: JobIdx, forward: bool) {
        let job = &self.jobs[idx.index()];
        let callee_key = combine_ids(job.fact_in_callee.get(), job.callee.get());
        let call_site_key = combine_ids(job.source_fact.get(), job.call_site.get());

        let prev = self.by_callee.insert(callee_key, idx);
        self.jobs[idx.index()].next_same_callee = prev;

        if forward {
            let prev = self.by_call_site.insert(call_site_key, idx);
            self.jobs[idx.index()].next_same_call_site = prev;
        }
    }

    pub fn get(&self, idx: JobIdx) -> &InterPropagationJob {
        &self.jobs[idx.index()]
    }

    /// Jobs passing `fact_in_callee` into `callee`, most recent first.
    pub fn by_callee(&self, fact_in_callee: FactId, callee: FunctionId) -> Chain<'_> {
        Chain {
            ledger: self,
            next: self
                .by_callee
                .get(&combine_ids(fact_in_callee.get(), callee.get()))
                .copied(),
            by_callee: true,
        }
    }

    /// Jobs leaving `call_site` for entry fact `source_fact`, most recent first.
    pub fn by_call_site(&self, source_fact: FactId, call_site: NodeId) -> Chain<'_> {
        Chain {
            ledger: self,
            next: self
                .by_call_site
                .get(&combine_ids(source_fact.get(), call_site.get()))
                .copied(),
            by_callee: false,
        }
    }

    /// Forgets the by-callee lists of `callee`. Returns the number of dropped list heads.
    pub fn purge_callee(&mut self, callee: FunctionId) -> usize {
        let before = self.by_callee.len();
        self.by_callee
            .retain(|&key, _| (key & u32::MAX as u64) as u32 != callee.get());
        before - self.by_callee.len()
    }

    pub fn clear_by_callee(&mut self) {
        self.by_callee.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn edge_functions(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.jobs.iter().map(|job| job.edge_function)
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.dedup.clear();
        self.by_callee.clear();
        self.by_call_site.clear();
    }
}

/// Iterator following one intrusive list of an [`InterJobLedger`].
pub struct Chain<'a> {
    ledger: &'a InterJobLedger,
    next: Option<JobIdx>,
    by_callee: bool,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a InterPropagationJob;

    fn next(&mut self) -> Option<Self::Item> {
        let job = self.ledger.get(self.next?);
        self.next = if self.by_callee {
            job.next_same_callee
        } else {
            job.next_same_call_site
        };
        Some(job)
    }
}
