use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod clock;
pub mod config;
pub mod eval;
pub mod flood_fill;
pub mod frontier;
pub mod graph_search;
pub mod mdp;
pub mod node;
pub mod q_learning;
pub mod search;
pub mod table;

#[cfg(test)]
mod search_test;

pub use clock::Clock;

/// Score of a position the perspective player has already lost.
pub const LOSS: f64 = f64::NEG_INFINITY;
/// Score of a position the perspective player has already won.
pub const WIN: f64 = f64::INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLimit {
    /// One search to exactly this many plies.
    Depth(u32),
    /// Deepen one ply at a time until the clock runs out (or the cap is hit).
    Iterative(Option<u32>),
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SearchStats {
    /// Deepest fully completed search.
    pub depth: u32,
    pub nodes: u64,
    pub time_ms: u64,
    pub score: f64,
}

/// Two-player, zero-sum, perfect-information game as seen by the searcher.
///
/// States are values: `forecast` returns a new state and never touches `self`.
pub trait Game: Clone {
    type Action: Copy + PartialEq + Debug;
    type Player: Copy + PartialEq + Debug;

    fn active_player(&self) -> Self::Player;
    /// Legal actions for the player to move, in a stable order.
    fn legal_actions(&self) -> Vec<Self::Action>;
    fn forecast(&self, action: Self::Action) -> Self;
    fn plies_played(&self) -> usize;
}

pub trait Evaluator<G: Game> {
    /// Heuristic value of `game` for `perspective`.
    ///
    /// Must return [`LOSS`] / [`WIN`] for decided positions so that they sort
    /// below / above every finite score.
    fn evaluate(&self, game: &G, perspective: G::Player) -> f64;
}

impl<G: Game, F: Fn(&G, G::Player) -> f64> Evaluator<G> for F {
    fn evaluate(&self, game: &G, perspective: G::Player) -> f64 {
        self(game, perspective)
    }
}

pub trait Searcher<G: Game> {
    /// Best action for the player to move, or `None` when there is no move to
    /// make (no legal actions, or the budget ran out before depth 1 finished).
    fn search(
        &mut self,
        game: &G,
        limit: SearchLimit,
        clock: &dyn Clock,
    ) -> Option<(G::Action, SearchStats)>;
}
