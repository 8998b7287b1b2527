/// A node of the graph-search tree.
///
/// Nodes live in a [`NodeArena`] and point at their parent by index; the root
/// has no parent and no producing action.
#[derive(Debug, Clone)]
pub struct SearchNode<S, A> {
    pub state: S,
    pub action: Option<A>,
    pub parent: Option<usize>,
    /// Cumulative path cost from the root.
    pub cost: u64,
    pub depth: u32,
}

/// Frontier ordering key. Lower is better: `f_cost`, then `h_cost` (closer to
/// the goal), then creation order (older first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrontierKey {
    pub f_cost: u64,
    pub h_cost: u64,
    pub creation_order: u64,
}

#[derive(Debug)]
pub struct NodeArena<S, A> {
    nodes: Vec<SearchNode<S, A>>,
}

impl<S, A: Copy> NodeArena<S, A> {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn root(&mut self, state: S) -> usize {
        self.push(SearchNode {
            state,
            action: None,
            parent: None,
            cost: 0,
            depth: 0,
        })
    }

    pub fn push(&mut self, node: SearchNode<S, A>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&SearchNode<S, A>> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Actions from the root to `index`, in order.
    pub fn path_to(&self, index: usize) -> Vec<A> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(index);
        while let Some(node) = cursor {
            if let Some(action) = node.action {
                path.push(action);
            }
            cursor = node.parent.and_then(|parent| self.nodes.get(parent));
        }
        path.reverse();
        path
    }
}

impl<S, A: Copy> Default for NodeArena<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
