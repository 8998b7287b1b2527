use crate::engine::frontier::{Frontier, PriorityFrontier, QueueFrontier, StackFrontier};
use crate::engine::node::{FrontierKey, NodeArena, SearchNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// One outgoing edge of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successor<S, A> {
    pub state: S,
    pub action: A,
    pub cost: u64,
}

/// Single-agent search problem with one start state and a goal test.
pub trait SearchProblem {
    type State: Clone + Eq + Hash;
    type Action: Copy;

    fn start_state(&self) -> Self::State;
    fn is_goal(&self, state: &Self::State) -> bool;
    fn successors(&self, state: &Self::State) -> Vec<Successor<Self::State, Self::Action>>;

    /// Estimated remaining cost, used by A*. Must never overestimate.
    fn heuristic(&self, _state: &Self::State) -> u64 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    DepthFirst,
    BreadthFirst,
    UniformCost,
    AStar,
}

impl SearchStrategy {
    fn frontier(self) -> Box<dyn Frontier> {
        match self {
            Self::DepthFirst => Box::<StackFrontier>::default(),
            Self::BreadthFirst => Box::<QueueFrontier>::default(),
            Self::UniformCost | Self::AStar => Box::<PriorityFrontier>::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    GoalReached,
    FrontierExhausted,
    ExpansionLimit,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<A> {
    /// Actions from the start to the goal. Empty when no goal was reached.
    pub path: Vec<A>,
    pub cost: u64,
    pub expanded: usize,
    pub frontier_high_water: usize,
    pub termination: Termination,
}

impl<A> SearchOutcome<A> {
    pub fn found(&self) -> bool {
        self.termination == Termination::GoalReached
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GraphSearch {
    strategy: SearchStrategy,
    expansion_limit: Option<usize>,
}

impl GraphSearch {
    #[must_use]
    pub const fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            expansion_limit: None,
        }
    }

    #[must_use]
    pub const fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    pub const fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Graph search with an explored set. The goal test happens when a node is
    /// popped, so uniform-cost and A* return cheapest paths. A state already
    /// explored is skipped on pop; cheaper duplicates may still sit in the
    /// priority frontier.
    pub fn run<P: SearchProblem>(&self, problem: &P) -> SearchOutcome<P::Action> {
        let mut arena: NodeArena<P::State, P::Action> = NodeArena::new();
        let mut frontier = self.strategy.frontier();
        let mut explored: HashSet<P::State> = HashSet::new();
        let mut expanded = 0;
        let mut created: u64 = 0;

        let start = problem.start_state();
        let root_key = self.key(problem, &start, 0, &mut created);
        let root = arena.root(start);
        frontier.push(root, root_key);

        let termination = loop {
            let Some(index) = frontier.pop() else {
                break Termination::FrontierExhausted;
            };
            let Some(node) = arena.get(index) else {
                break Termination::FrontierExhausted;
            };

            if problem.is_goal(&node.state) {
                let cost = node.cost;
                let path = arena.path_to(index);
                log::debug!(
                    "{:?}: goal after {} expansions, {} actions, cost {}",
                    self.strategy,
                    expanded,
                    path.len(),
                    cost
                );
                return SearchOutcome {
                    path,
                    cost,
                    expanded,
                    frontier_high_water: frontier.high_water(),
                    termination: Termination::GoalReached,
                };
            }

            if explored.contains(&node.state) {
                continue;
            }
            if self.expansion_limit.is_some_and(|limit| expanded >= limit) {
                break Termination::ExpansionLimit;
            }

            let state = node.state.clone();
            let (cost, depth) = (node.cost, node.depth);
            explored.insert(state.clone());
            expanded += 1;

            for successor in problem.successors(&state) {
                if explored.contains(&successor.state) {
                    continue;
                }
                let g_cost = cost.saturating_add(successor.cost);
                let key = self.key(problem, &successor.state, g_cost, &mut created);
                let child = arena.push(SearchNode {
                    state: successor.state,
                    action: Some(successor.action),
                    parent: Some(index),
                    cost: g_cost,
                    depth: depth + 1,
                });
                frontier.push(child, key);
            }
        };

        log::debug!(
            "{:?}: no path ({:?}) after {} expansions",
            self.strategy,
            termination,
            expanded
        );
        SearchOutcome {
            path: Vec::new(),
            cost: 0,
            expanded,
            frontier_high_water: frontier.high_water(),
            termination,
        }
    }

    fn key<P: SearchProblem>(
        &self,
        problem: &P,
        state: &P::State,
        g_cost: u64,
        created: &mut u64,
    ) -> FrontierKey {
        let h_cost = match self.strategy {
            SearchStrategy::AStar => problem.heuristic(state),
            _ => 0,
        };
        let creation_order = *created;
        *created += 1;
        FrontierKey {
            f_cost: g_cost.saturating_add(h_cost),
            h_cost,
            creation_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Weighted digraph given as an adjacency list of (to, cost).
    struct Graph {
        edges: Vec<Vec<(usize, u64)>>,
        goal: usize,
    }

    impl SearchProblem for Graph {
        type State = usize;
        type Action = usize;

        fn start_state(&self) -> usize {
            0
        }

        fn is_goal(&self, state: &usize) -> bool {
            *state == self.goal
        }

        fn successors(&self, state: &usize) -> Vec<Successor<usize, usize>> {
            self.edges
                .get(*state)
                .map(|edges| {
                    edges
                        .iter()
                        .map(|&(to, cost)| Successor {
                            state: to,
                            action: to,
                            cost,
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    fn diamond() -> Graph {
        // 0 -> 1 -> 3 is short but expensive, 0 -> 2 -> 4 -> 3 is cheap
        Graph {
            edges: vec![vec![(1, 1), (2, 1)], vec![(3, 10)], vec![(4, 1)], vec![], vec![(3, 1)]],
            goal: 3,
        }
    }

    #[test]
    fn test_bfs_finds_fewest_actions() {
        let outcome = GraphSearch::new(SearchStrategy::BreadthFirst).run(&diamond());
        assert!(outcome.found());
        assert_eq!(outcome.path, vec![1, 3]);
        assert_eq!(outcome.cost, 11);
    }

    #[test]
    fn test_ucs_finds_cheapest_path() {
        let outcome = GraphSearch::new(SearchStrategy::UniformCost).run(&diamond());
        assert_eq!(outcome.path, vec![2, 4, 3]);
        assert_eq!(outcome.cost, 3);
    }

    #[test]
    fn test_dfs_finds_some_path() {
        let outcome = GraphSearch::new(SearchStrategy::DepthFirst).run(&diamond());
        assert!(outcome.found());
        assert_eq!(outcome.path.last(), Some(&3));
    }

    #[test]
    fn test_unreachable_goal_gives_empty_path() {
        let graph = Graph {
            edges: vec![vec![(1, 1)], vec![(0, 1)], vec![]],
            goal: 2,
        };
        for strategy in [
            SearchStrategy::DepthFirst,
            SearchStrategy::BreadthFirst,
            SearchStrategy::UniformCost,
            SearchStrategy::AStar,
        ] {
            let outcome = GraphSearch::new(strategy).run(&graph);
            assert!(outcome.path.is_empty());
            assert_eq!(outcome.termination, Termination::FrontierExhausted);
            // Cycle 0 <-> 1 is expanded once per state
            assert_eq!(outcome.expanded, 2);
        }
    }

    #[test]
    fn test_start_is_goal() {
        let graph = Graph {
            edges: vec![vec![(1, 1)]],
            goal: 0,
        };
        let outcome = GraphSearch::new(SearchStrategy::AStar).run(&graph);
        assert!(outcome.found());
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.expanded, 0);
    }

    #[test]
    fn test_expansion_limit() {
        let outcome = GraphSearch::new(SearchStrategy::BreadthFirst)
            .with_expansion_limit(1)
            .run(&diamond());
        assert_eq!(outcome.termination, Termination::ExpansionLimit);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.expanded, 1);
    }
}
