//! Flow functions.
//!
//! A flow function maps one source fact to the set of facts holding after an edge.
//! The common shapes are closed variants so the solver can cache and inspect them;
//! anything else goes through [`FlowFunction::Lambda`].

use std::fmt;
use std::rc::Rc;

/// A pure map from one fact to the facts it generates across an edge.
#[derive(Clone)]
pub enum FlowFunction<D> {
    /// `d ↦ {d}`
    Identity,
    /// `d ↦ {}`
    KillAll,
    /// Generates `facts` when `from` holds: `from ↦ {from} ∪ facts`, other `d ↦ {d}`.
    Gen { from: D, facts: Vec<D> },
    /// Kills one fact: `fact ↦ {}`, other `d ↦ {d}`.
    Kill(D),
    /// Strong update of `to` with `from`: `from ↦ {from, to}`, `to ↦ {}`, other `d ↦ {d}`.
    Transfer { from: D, to: D },
    /// Renames facts, killing everything not mentioned: `d ↦ { t | (d, t) ∈ pairs }`.
    ///
    /// The usual shape of call (actual to formal) and return (formal to actual) flow.
    Map(Vec<(D, D)>),
    /// Union of the targets of all parts.
    Union(Vec<FlowFunction<D>>),
    /// Arbitrary client code.
    Lambda(Rc<dyn Fn(&D) -> Vec<D>>),
}

impl<D> FlowFunction<D>
where
    D: Clone + PartialEq,
{
    /// Convenience constructor for [`FlowFunction::Gen`].
    pub fn gen(from: D, facts: impl IntoIterator<Item = D>) -> Self {
        FlowFunction::Gen {
            from,
            facts: facts.into_iter().collect(),
        }
    }

    /// Convenience constructor for [`FlowFunction::Lambda`].
    pub fn lambda(f: impl Fn(&D) -> Vec<D> + 'static) -> Self {
        FlowFunction::Lambda(Rc::new(f))
    }

    /// Computes the facts generated by `source`. The result holds no duplicates.
    pub fn compute_targets(&self, source: &D) -> Vec<D> {
        let mut targets = Vec::new();
        self.collect_targets(source, &mut targets);
        targets
    }

    fn collect_targets(&self, source: &D, out: &mut Vec<D>) {
        match self {
            FlowFunction::Identity => push_unique(out, source.clone()),
            FlowFunction::KillAll => {}
            FlowFunction::Gen { from, facts } => {
                push_unique(out, source.clone());
                if source == from {
                    for fact in facts {
                        push_unique(out, fact.clone());
                    }
                }
            }
            FlowFunction::Kill(fact) => {
                if source != fact {
                    push_unique(out, source.clone());
                }
            }
            FlowFunction::Transfer { from, to } => {
                if source == from {
                    push_unique(out, from.clone());
                    push_unique(out, to.clone());
                } else if source != to {
                    push_unique(out, source.clone());
                }
            }
            FlowFunction::Map(pairs) => {
                for (d, t) in pairs {
                    if d == source {
                        push_unique(out, t.clone());
                    }
                }
            }
            FlowFunction::Union(parts) => {
                for part in parts {
                    part.collect_targets(source, out);
                }
            }
            FlowFunction::Lambda(f) => {
                for fact in f(source) {
                    push_unique(out, fact);
                }
            }
        }
    }
}

fn push_unique<D: PartialEq>(out: &mut Vec<D>, fact: D) {
    if !out.contains(&fact) {
        out.push(fact);
    }
}

impl<D: fmt::Debug> fmt::Debug for FlowFunction<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowFunction::Identity => write!(f, "Identity"),
            FlowFunction::KillAll => write!(f, "KillAll"),
            FlowFunction::Gen { from, facts } => write!(f, "Gen({:?} -> {:?})", from, facts),
            FlowFunction::Kill(fact) => write!(f, "Kill({:?})", fact),
            FlowFunction::Transfer { from, to } => write!(f, "Transfer({:?} -> {:?})", from, to),
            FlowFunction::Map(pairs) => write!(f, "Map({:?})", pairs),
            FlowFunction::Union(parts) => f.debug_list().entries(parts).finish(),
            FlowFunction::Lambda(_) => write!(f, "Lambda"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_and_kill_all() {
        assert_eq!(FlowFunction::Identity.compute_targets(&3), vec![3]);
        assert!(FlowFunction::<u32>::KillAll.compute_targets(&3).is_empty());
    }

    #[test]
    fn test_gen() {
        let ff = FlowFunction::gen(0, [1, 2]);
        assert_eq!(ff.compute_targets(&0), vec![0, 1, 2]);
        assert_eq!(ff.compute_targets(&5), vec![5]);
    }

    #[test]
    fn test_kill() {
        let ff = FlowFunction::Kill(4);
        assert!(ff.compute_targets(&4).is_empty());
        assert_eq!(ff.compute_targets(&1), vec![1]);
    }

    #[test]
    fn test_transfer() {
        let ff = FlowFunction::Transfer { from: 1, to: 2 };
        assert_eq!(ff.compute_targets(&1), vec![1, 2]);
        assert!(ff.compute_targets(&2).is_empty());
        assert_eq!(ff.compute_targets(&3), vec![3]);
    }

    #[test]
    fn test_map() {
        let ff = FlowFunction::Map(vec![(0, 0), (1, 10), (1, 11)]);
        assert_eq!(ff.compute_targets(&0), vec![0]);
        assert_eq!(ff.compute_targets(&1), vec![10, 11]);
        assert!(ff.compute_targets(&2).is_empty());
    }

    #[test]
    fn test_union_dedups() {
        let ff = FlowFunction::Union(vec![
            FlowFunction::Identity,
            FlowFunction::gen(1, [2]),
            FlowFunction::lambda(|d: &u32| vec![*d, d + 100]),
        ]);
        assert_eq!(ff.compute_targets(&1), vec![1, 2, 101]);
        println!("{:?}", ff);
    }
}
