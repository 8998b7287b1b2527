use crate::engine::graph_search::{GraphSearch, SearchStrategy};
use crate::engine::mdp::MdpError;
use crate::logic::maze::{Cell, Direction, PositionProblem, Sensors};
use crate::robot::explore::wander;
use crate::robot::{Session, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Explores at random until enough of the maze is known, then plans a route
/// from the start to the goal cell with one of the graph searches and
/// replays it on the timed run.
pub struct Planner {
    search: GraphSearch,
    explore_threshold_pct: f64,
    plan: VecDeque<Direction>,
    rng: StdRng,
}

impl Planner {
    #[must_use]
    pub fn new(strategy: SearchStrategy, explore_threshold_pct: f64, seed: u64) -> Self {
        Self {
            search: GraphSearch::new(strategy),
            explore_threshold_pct,
            plan: VecDeque::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Directions still to be driven.
    pub const fn plan(&self) -> &VecDeque<Direction> {
        &self.plan
    }
}

impl Strategy for Planner {
    fn title(&self) -> &'static str {
        match self.search.strategy() {
            SearchStrategy::DepthFirst => "GRAPH SEARCH: DEPTH FIRST",
            SearchStrategy::BreadthFirst => "GRAPH SEARCH: BREADTH FIRST",
            SearchStrategy::UniformCost => "GRAPH SEARCH: UNIFORM COST",
            SearchStrategy::AStar => "GRAPH SEARCH: A-STAR, MANHATTAN",
        }
    }

    fn assume_open_walls(&self) -> bool {
        false
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        wander(session, sensors, &mut self.rng)
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        session.has_reached_center() && session.percent_explored() >= self.explore_threshold_pct
    }

    fn before_reset(&mut self, session: &Session) -> Result<(), MdpError> {
        let problem = PositionProblem::new(session.model(), Cell::ORIGIN, session.goal_cell());
        let outcome = self.search.run(&problem);
        if outcome.found() {
            log::info!(
                "{}: {} moves to {}, {} cells expanded",
                self.title(),
                outcome.path.len(),
                problem.goal(),
                outcome.expanded
            );
        } else {
            log::warn!("{}: no route to {}", self.title(), problem.goal());
        }
        self.plan = outcome.path.into();
        Ok(())
    }

    /// Next planned direction. A direction behind the robot is only consumed
    /// once the turn-around has finished and the robot actually moves.
    fn exploit(&mut self, session: &Session) -> Result<Option<Direction>, MdpError> {
        let Some(&next) = self.plan.front() else {
            return Ok(None);
        };
        if next != session.heading().reverse() {
            self.plan.pop_front();
        }
        Ok(Some(next))
    }
}
