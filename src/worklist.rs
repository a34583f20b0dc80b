//! Worklists driving the fixpoint loops.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::config::WorklistOrder;

/// Pending jobs, processed in LIFO or FIFO order.
#[derive(Debug, Clone)]
pub struct Worklist<T> {
    items: VecDeque<T>,
    order: WorklistOrder,
    high_watermark: usize,
}

impl<T> Worklist<T> {
    pub fn new(order: WorklistOrder) -> Self {
        Self {
            items: VecDeque::new(),
            order,
            high_watermark: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        self.high_watermark = self.high_watermark.max(self.items.len());
    }

    pub fn pop(&mut self) -> Option<T> {
        match self.order {
            WorklistOrder::Lifo => self.items.pop_back(),
            WorklistOrder::Fifo => self.items.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest size seen so far.
    pub fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Deduplicating, insertion-ordered set of `(entry fact, function)` keys whose summaries changed.
#[derive(Debug, Clone, Default)]
pub struct CallWorklist {
    order: Vec<u64>,
    seen: FxHashSet<u64>,
    high_watermark: usize,
}

impl CallWorklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the key was already pending.
    pub fn insert(&mut self, key: u64) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.order.push(key);
        self.high_watermark = self.high_watermark.max(self.order.len());
        true
    }

    /// Removes and returns all pending keys in insertion order.
    pub fn take(&mut self) -> Vec<u64> {
        self.seen.clear();
        std::mem::take(&mut self.order)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}
