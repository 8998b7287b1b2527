use crate::engine::clock::duration_ms;
use crate::engine::config::{EngineConfig, SearchMethod};
use crate::engine::{Clock, Evaluator, Game, SearchLimit, SearchStats, Searcher};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Raised from inside the recursion once the clock drops below the configured
/// threshold. Only `Searcher::search` catches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout;

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("search ran out of time")
    }
}

impl std::error::Error for Timeout {}

pub type Scored<A> = (f64, Option<A>);

pub struct AlphaBetaEngine<E> {
    config: Arc<EngineConfig>,
    evaluator: E,
    rng: StdRng,
    nodes_searched: u64,
    // Set when some leaf was cut off by depth rather than by the game ending.
    depth_cutoff: bool,
}

impl<E> AlphaBetaEngine<E> {
    pub fn new(config: Arc<EngineConfig>, evaluator: E) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            evaluator,
            nodes_searched: 0,
            depth_cutoff: false,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        if config.seed != self.config.seed {
            self.rng = StdRng::seed_from_u64(config.seed);
        }
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    fn check_time(&self, clock: &dyn Clock) -> Result<(), Timeout> {
        if clock.time_left() < self.config.timer_threshold_ms {
            Err(Timeout)
        } else {
            Ok(())
        }
    }

    /// Plain depth-limited minimax. `perspective` is the maximizing player.
    pub fn minimax<G>(
        &mut self,
        game: &G,
        depth: u32,
        perspective: G::Player,
        clock: &dyn Clock,
    ) -> Result<Scored<G::Action>, Timeout>
    where
        G: Game,
        E: Evaluator<G>,
    {
        self.nodes_searched += 1;
        self.check_time(clock)?;

        let actions = game.legal_actions();
        if actions.is_empty() {
            return Ok((self.evaluator.evaluate(game, perspective), None));
        }
        if depth == 0 {
            self.depth_cutoff = true;
            return Ok((self.evaluator.evaluate(game, perspective), None));
        }

        let maximizing = game.active_player() == perspective;
        let mut best_score = None;
        let mut best_action = None;
        for action in actions {
            let (score, _) = self.minimax(&game.forecast(action), depth - 1, perspective, clock)?;
            if improves(best_score, score, maximizing) {
                best_score = Some(score);
                best_action = Some(action);
            }
        }
        Ok((best_score.unwrap_or_default(), best_action))
    }

    /// Fail-soft alpha-beta. Picks the same action and score as `minimax` for
    /// the same depth; pruning only skips work.
    pub fn alpha_beta<G>(
        &mut self,
        game: &G,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        perspective: G::Player,
        clock: &dyn Clock,
    ) -> Result<Scored<G::Action>, Timeout>
    where
        G: Game,
        E: Evaluator<G>,
    {
        self.nodes_searched += 1;
        self.check_time(clock)?;

        let actions = game.legal_actions();
        if actions.is_empty() {
            return Ok((self.evaluator.evaluate(game, perspective), None));
        }
        if depth == 0 {
            self.depth_cutoff = true;
            return Ok((self.evaluator.evaluate(game, perspective), None));
        }

        let maximizing = game.active_player() == perspective;
        let mut best_score = None;
        let mut best_action = None;
        for action in actions {
            let (score, _) = self.alpha_beta(
                &game.forecast(action),
                depth - 1,
                alpha,
                beta,
                perspective,
                clock,
            )?;
            if improves(best_score, score, maximizing) {
                best_score = Some(score);
                best_action = Some(action);
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok((best_score.unwrap_or_default(), best_action))
    }

    fn search_depth<G>(
        &mut self,
        game: &G,
        depth: u32,
        clock: &dyn Clock,
    ) -> Result<Scored<G::Action>, Timeout>
    where
        G: Game,
        E: Evaluator<G>,
    {
        let perspective = game.active_player();
        match self.config.method {
            SearchMethod::Minimax => self.minimax(game, depth, perspective, clock),
            SearchMethod::AlphaBeta => self.alpha_beta(
                game,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                perspective,
                clock,
            ),
        }
    }
}

// First child always wins, later children only if strictly better.
fn improves(best: Option<f64>, score: f64, maximizing: bool) -> bool {
    match best {
        None => true,
        Some(best) if maximizing => score > best,
        Some(best) => score < best,
    }
}

impl<G, E> Searcher<G> for AlphaBetaEngine<E>
where
    G: Game,
    E: Evaluator<G>,
{
    fn search(
        &mut self,
        game: &G,
        limit: SearchLimit,
        clock: &dyn Clock,
    ) -> Option<(G::Action, SearchStats)> {
        let start = Instant::now();
        self.nodes_searched = 0;

        let actions = game.legal_actions();
        if actions.is_empty() {
            log::debug!("no legal actions at the root");
            return None;
        }

        // Opening bypass: early positions are not worth the clock.
        if game.plies_played() < self.config.random_opening_plies {
            let action = *actions.choose(&mut self.rng)?;
            log::debug!("opening ply {}: random {:?}", game.plies_played(), action);
            return Some((action, SearchStats::default()));
        }

        let (first_depth, last_depth) = match limit {
            SearchLimit::Depth(d) => (d.max(1), d.max(1)),
            SearchLimit::Iterative(cap) => (1, cap.unwrap_or(u32::MAX).max(1)),
        };

        let mut best_action = None;
        let mut stats = SearchStats::default();

        for depth in first_depth..=last_depth {
            self.depth_cutoff = false;
            match self.search_depth(game, depth, clock) {
                Ok((score, Some(action))) => {
                    best_action = Some(action);
                    stats.depth = depth;
                    stats.score = score;
                    log::debug!(
                        "depth {} done: {:?} score {} nodes {}",
                        depth,
                        action,
                        score,
                        self.nodes_searched
                    );
                }
                Ok((_, None)) => break,
                Err(Timeout) => {
                    log::debug!("depth {depth} cancelled, keeping depth {}", stats.depth);
                    break;
                }
            }
            // Nothing deeper to see
            if !self.depth_cutoff {
                break;
            }
        }

        stats.nodes = self.nodes_searched;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            stats.time_ms = duration_ms(start.elapsed()) as u64;
        }
        best_action.map(|action| (action, stats))
    }
}
