use crate::engine::node::FrontierKey;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// Nodes waiting to be expanded, stored as arena indices. The key is only
/// consulted by [`PriorityFrontier`].
pub trait Frontier {
    fn push(&mut self, node: usize, key: FrontierKey);
    fn pop(&mut self) -> Option<usize>;
    fn len(&self) -> usize;
    /// Largest size the frontier ever reached.
    fn high_water(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Last in, first out (depth-first).
#[derive(Debug, Default)]
pub struct StackFrontier {
    items: Vec<usize>,
    high_water: usize,
}

impl Frontier for StackFrontier {
    fn push(&mut self, node: usize, _key: FrontierKey) {
        self.items.push(node);
        self.high_water = self.high_water.max(self.items.len());
    }

    fn pop(&mut self) -> Option<usize> {
        self.items.pop()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// First in, first out (breadth-first).
#[derive(Debug, Default)]
pub struct QueueFrontier {
    items: VecDeque<usize>,
    high_water: usize,
}

impl Frontier for QueueFrontier {
    fn push(&mut self, node: usize, _key: FrontierKey) {
        self.items.push_back(node);
        self.high_water = self.high_water.max(self.items.len());
    }

    fn pop(&mut self) -> Option<usize> {
        self.items.pop_front()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// Lowest key first (uniform-cost and A*).
///
/// `BinaryHeap` is a max-heap, so entries are wrapped in `Reverse`.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<Reverse<(FrontierKey, usize)>>,
    high_water: usize,
}

impl Frontier for PriorityFrontier {
    fn push(&mut self, node: usize, key: FrontierKey) {
        self.heap.push(Reverse((key, node)));
        self.high_water = self.high_water.max(self.heap.len());
    }

    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse((_, node))| node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}
