//! Edge-function manager.
//!
//! All edge functions of a solver instance live in one [`EdgeFunctions`] manager, in the
//! same manager-centric style as a decision-diagram library: the manager owns the nodes,
//! hands out lightweight [`EdgeRef`] handles, hash-conses structurally equal nodes and
//! memoizes `compose` and `join`.
//!
//! # Node kinds
//!
//! - **Identity**, **AllTop**, **AllBottom**: reserved handles [`EdgeRef::IDENTITY`],
//!   [`EdgeRef::ALL_TOP`], [`EdgeRef::ALL_BOTTOM`]. They are never looked up or collected.
//! - **Constant(c)**: `λv. c`, for `c` different from top and bottom.
//! - **Custom(k)**: a client payload.
//! - **Compose(f, g)**: `λv. g(f(v))`, i.e. first `f`, then `g`.
//! - **Join { seed, parts }**: `λv. seed ⊔ p₁(v) ⊔ … ⊔ pₙ(v)`, with `parts` sorted by handle.
//!
//! # Normal forms
//!
//! Composition:
//!
//! - Identity is neutral on both sides.
//! - If `g` ignores its input, `f ; g = g`.
//! - If `f` is constant `c`, `f ; g` is the constant `g(c)`.
//! - `Custom ; Custom` is folded by the client when it can.
//! - Compositions are kept right-nested: `(a ; b) ; g = a ; (b ; g)`.
//!
//! Join:
//!
//! - AllTop is neutral, AllBottom absorbs.
//! - Constants fold into the seed, nested joins are flattened, parts are sorted and deduplicated.
//!   Hence `join(a, b)` and `join(b, a)` yield the same handle, and `join(a, a) = a`.
//! - A join with more than `join_limit` parts over-approximates to AllBottom.
//!
//! # Invariants
//!
//! - Two live nodes of a cacheable kind are never structurally equal.
//! - A handle stays valid until a [`collect_garbage`][EdgeFunctions::collect_garbage] call
//!   that does not reach it from the given roots.

use std::fmt::{self, Debug, Display};

use log::debug;
use smallvec::SmallVec;

use crate::bitset::BitSet;
use crate::cache::Cache;
use crate::edge_function::{CustomEdgeFunction, EdgeFunction};
use crate::lattice::JoinLattice;
use crate::singleton::{HasKind, KindCaches};

/// Handle to an edge function owned by an [`EdgeFunctions`] manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeRef(u32);

impl EdgeRef {
    pub const IDENTITY: EdgeRef = EdgeRef(0);
    pub const ALL_TOP: EdgeRef = EdgeRef(1);
    pub const ALL_BOTTOM: EdgeRef = EdgeRef(2);

    const RESERVED: u32 = 3;

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_reserved(self) -> bool {
        self.0 < Self::RESERVED
    }
}

impl Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Join operands stored inline for the common small case.
pub type JoinParts = SmallVec<[EdgeRef; 4]>;

/// An interned edge-function node.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EdgeNode<L, K> {
    Identity,
    AllTop,
    AllBottom,
    Constant(L),
    Custom(K),
    Compose(EdgeRef, EdgeRef),
    Join { seed: L, parts: JoinParts },
}

/// Kind tag selecting the canonicalization table of an [`EdgeNode`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EdgeKind {
    Constant,
    Custom,
    Compose,
    Join,
}

impl<L, K> HasKind for EdgeNode<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    type Kind = EdgeKind;

    fn kind(&self) -> Option<EdgeKind> {
        match self {
            EdgeNode::Identity | EdgeNode::AllTop | EdgeNode::AllBottom => None,
            EdgeNode::Constant(_) => Some(EdgeKind::Constant),
            EdgeNode::Custom(k) => k.is_cacheable().then_some(EdgeKind::Custom),
            EdgeNode::Compose(..) => Some(EdgeKind::Compose),
            EdgeNode::Join { .. } => Some(EdgeKind::Join),
        }
    }
}

/// Owner of all edge functions of one solver instance.
pub struct EdgeFunctions<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    nodes: Vec<Option<EdgeNode<L, K>>>,
    free: Vec<u32>,
    unique: KindCaches<EdgeNode<L, K>, EdgeRef>,
    compose_cache: Cache<(EdgeRef, EdgeRef), EdgeRef>,
    join_cache: Cache<(EdgeRef, EdgeRef), EdgeRef>,
    join_limit: usize,
    num_interned: usize,
    num_swept: usize,
}

impl<L, K> Default for EdgeFunctions<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    fn default() -> Self {
        Self::new(8)
    }
}

impl<L, K> EdgeFunctions<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    /// Creates a manager whose join nodes hold at most `join_limit` non-constant operands.
    pub fn new(join_limit: usize) -> Self {
        assert!(join_limit >= 2, "join_limit must be at least 2, got {}", join_limit);
        Self {
            nodes: vec![
                Some(EdgeNode::Identity),
                Some(EdgeNode::AllTop),
                Some(EdgeNode::AllBottom),
            ],
            free: Vec::new(),
            unique: KindCaches::default(),
            compose_cache: Cache::new(),
            join_cache: Cache::new(),
            join_limit,
            num_interned: 0,
            num_swept: 0,
        }
    }

    /// Number of live nodes, reserved ones included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of nodes allocated so far.
    pub fn num_interned(&self) -> usize {
        self.num_interned
    }

    /// Total number of nodes reclaimed by garbage collection so far.
    pub fn num_swept(&self) -> usize {
        self.num_swept
    }

    pub fn cache_hits(&self) -> usize {
        self.compose_cache.hits() + self.join_cache.hits()
    }

    pub fn cache_misses(&self) -> usize {
        self.compose_cache.misses() + self.join_cache.misses()
    }

    /// Returns the node behind `ef`.
    ///
    /// # Panics
    ///
    /// Panics if `ef` was collected.
    pub fn node(&self, ef: EdgeRef) -> &EdgeNode<L, K> {
        match self.nodes.get(ef.index()) {
            Some(Some(node)) => node,
            _ => panic!("Edge function {} is not alive", ef),
        }
    }

    fn intern(&mut self, node: EdgeNode<L, K>) -> EdgeRef {
        if let Some(ef) = self.unique.lookup(&node) {
            return ef;
        }
        let ef = match self.free.pop() {
            Some(index) => {
                self.nodes[index as usize] = Some(node.clone());
                EdgeRef(index)
            }
            None => {
                assert!(self.nodes.len() < u32::MAX as usize, "Edge function handles exhausted");
                self.nodes.push(Some(node.clone()));
                EdgeRef((self.nodes.len() - 1) as u32)
            }
        };
        self.unique.insert(node, ef);
        self.num_interned += 1;
        ef
    }

    /// Interns a client edge function.
    pub fn leaf(&mut self, ef: EdgeFunction<L, K>) -> EdgeRef {
        match ef {
            EdgeFunction::Identity => EdgeRef::IDENTITY,
            EdgeFunction::AllTop => EdgeRef::ALL_TOP,
            EdgeFunction::AllBottom => EdgeRef::ALL_BOTTOM,
            EdgeFunction::Constant(c) => self.constant(c),
            EdgeFunction::Custom(k) => match k.as_constant() {
                Some(c) => self.constant(c),
                None => self.intern(EdgeNode::Custom(k)),
            },
        }
    }

    /// Returns the handle of `λv. c`.
    pub fn constant(&mut self, c: L) -> EdgeRef {
        if c.is_top() {
            EdgeRef::ALL_TOP
        } else if c.is_bottom() {
            EdgeRef::ALL_BOTTOM
        } else {
            self.intern(EdgeNode::Constant(c))
        }
    }

    /// Returns the result of `ef` if it ignores its input.
    pub fn constant_value(&self, ef: EdgeRef) -> Option<L> {
        match self.node(ef) {
            EdgeNode::AllTop => Some(L::top()),
            EdgeNode::AllBottom => Some(L::bottom()),
            EdgeNode::Constant(c) => Some(c.clone()),
            _ => None,
        }
    }

    pub fn is_constant(&self, ef: EdgeRef) -> bool {
        matches!(
            self.node(ef),
            EdgeNode::AllTop | EdgeNode::AllBottom | EdgeNode::Constant(_)
        )
    }

    /// Applies `ef` to `source`.
    pub fn compute_target(&self, ef: EdgeRef, source: &L) -> L {
        match self.node(ef) {
            EdgeNode::Identity => source.clone(),
            EdgeNode::AllTop => L::top(),
            EdgeNode::AllBottom => L::bottom(),
            EdgeNode::Constant(c) => c.clone(),
            EdgeNode::Custom(k) => k.compute_target(source),
            EdgeNode::Compose(first, second) => {
                let mid = self.compute_target(*first, source);
                self.compute_target(*second, &mid)
            }
            EdgeNode::Join { seed, parts } => parts
                .iter()
                .fold(seed.clone(), |acc, &p| acc.join(&self.compute_target(p, source))),
        }
    }

    /// Returns `first ; second`, the function applying `first` and then `second`.
    pub fn compose(&mut self, first: EdgeRef, second: EdgeRef) -> EdgeRef {
        if first == EdgeRef::IDENTITY {
            return second;
        }
        if second == EdgeRef::IDENTITY {
            return first;
        }

        let key = (first, second);
        if let Some(&res) = self.compose_cache.get(&key) {
            debug!("cache: compose({}, {}) -> {}", first, second, res);
            return res;
        }

        let res = self.compose_uncached(first, second);
        debug!("compose({}, {}) -> {}", first, second, res);
        self.compose_cache.insert(key, res);
        res
    }

    fn compose_uncached(&mut self, first: EdgeRef, second: EdgeRef) -> EdgeRef {
        if self.is_constant(second) {
            return second;
        }
        if let Some(c) = self.constant_value(first) {
            let value = self.compute_target(second, &c);
            return self.constant(value);
        }

        if let (EdgeNode::Custom(f), EdgeNode::Custom(g)) = (self.node(first), self.node(second)) {
            if let Some(k) = f.compose(g) {
                return self.leaf(EdgeFunction::Custom(k));
            }
        }

        if let EdgeNode::Compose(a, b) = *self.node(first) {
            let tail = self.compose(b, second);
            return self.compose(a, tail);
        }

        self.intern(EdgeNode::Compose(first, second))
    }

    /// Returns the pointwise join of `a` and `b`.
    pub fn join(&mut self, a: EdgeRef, b: EdgeRef) -> EdgeRef {
        if a == b {
            return a;
        }

        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&res) = self.join_cache.get(&key) {
            debug!("cache: join({}, {}) -> {}", a, b, res);
            return res;
        }

        let res = self.join_uncached(key.0, key.1);
        debug!("join({}, {}) -> {}", a, b, res);
        self.join_cache.insert(key, res);
        res
    }

    fn join_uncached(&mut self, a: EdgeRef, b: EdgeRef) -> EdgeRef {
        if a == EdgeRef::ALL_TOP {
            return b;
        }
        if b == EdgeRef::ALL_TOP {
            return a;
        }
        if a == EdgeRef::ALL_BOTTOM || b == EdgeRef::ALL_BOTTOM {
            return EdgeRef::ALL_BOTTOM;
        }

        if let (EdgeNode::Custom(x), EdgeNode::Custom(y)) = (self.node(a), self.node(b)) {
            if let Some(k) = x.join(y) {
                return self.leaf(EdgeFunction::Custom(k));
            }
        }

        let mut seed = L::top();
        let mut parts = JoinParts::new();
        for ef in [a, b] {
            match self.node(ef) {
                EdgeNode::Constant(c) => seed = seed.join(c),
                EdgeNode::Join { seed: s, parts: ps } => {
                    seed = seed.join(s);
                    parts.extend_from_slice(ps);
                }
                _ => parts.push(ef),
            }
        }
        parts.sort_unstable();
        parts.dedup();

        self.make_join(seed, parts)
    }

    fn make_join(&mut self, seed: L, parts: JoinParts) -> EdgeRef {
        if seed.is_bottom() {
            return EdgeRef::ALL_BOTTOM;
        }
        if parts.is_empty() {
            return self.constant(seed);
        }
        if parts.len() == 1 && seed.is_top() {
            return parts[0];
        }
        if parts.len() > self.join_limit {
            debug!(
                "join over {} parts exceeds limit {}, widening to AllBottom",
                parts.len(),
                self.join_limit
            );
            return EdgeRef::ALL_BOTTOM;
        }
        self.intern(EdgeNode::Join { seed, parts })
    }

    /// Frees every node not reachable from `roots`. Returns the number of freed nodes.
    ///
    /// Memo caches are cleared, since they may mention freed handles.
    pub fn collect_garbage(&mut self, roots: impl IntoIterator<Item = EdgeRef>) -> usize {
        debug!("Collecting edge-function garbage...");

        self.compose_cache.clear();
        self.join_cache.clear();

        let mut alive = BitSet::new(self.nodes.len());
        let mut stack: Vec<EdgeRef> = roots.into_iter().collect();
        while let Some(ef) = stack.pop() {
            if !alive.insert(ef.index()) {
                continue;
            }
            match self.node(ef) {
                EdgeNode::Compose(first, second) => {
                    stack.push(*first);
                    stack.push(*second);
                }
                EdgeNode::Join { parts, .. } => stack.extend(parts.iter().copied()),
                _ => {}
            }
        }

        let mut freed = 0;
        for index in EdgeRef::RESERVED as usize..self.nodes.len() {
            if alive.contains(index) {
                continue;
            }
            if let Some(node) = self.nodes[index].take() {
                self.unique.erase(&node);
                self.free.push(index as u32);
                freed += 1;
            }
        }

        self.num_swept += freed;
        debug!("Freed {} edge functions, {} alive", freed, self.len());
        freed
    }

    /// Returns a displayable view of `ef`.
    pub fn display(&self, ef: EdgeRef) -> EdgeDisplay<'_, L, K> {
        EdgeDisplay { manager: self, ef }
    }
}

/// [`Display`] adapter returned by [`EdgeFunctions::display`].
pub struct EdgeDisplay<'a, L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    manager: &'a EdgeFunctions<L, K>,
    ef: EdgeRef,
}

impl<L, K> Display for EdgeDisplay<'_, L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.manager.node(self.ef) {
            EdgeNode::Identity => write!(f, "id"),
            EdgeNode::AllTop => write!(f, "⊤"),
            EdgeNode::AllBottom => write!(f, "⊥"),
            EdgeNode::Constant(c) => write!(f, "const({:?})", c),
            EdgeNode::Custom(k) => write!(f, "{:?}", k),
            EdgeNode::Compose(first, second) => write!(
                f,
                "({} ; {})",
                self.manager.display(*first),
                self.manager.display(*second)
            ),
            EdgeNode::Join { seed, parts } => {
                write!(f, "join({:?}", seed)?;
                for &p in parts {
                    write!(f, ", {}", self.manager.display(p))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl<L, K> Debug for EdgeFunctions<L, K>
where
    L: JoinLattice,
    K: CustomEdgeFunction<L>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeFunctions")
            .field("live", &(self.nodes.len() - self.free.len()))
            .field("free", &self.free.len())
            .field("join_limit", &self.join_limit)
            .finish()
    }
}
