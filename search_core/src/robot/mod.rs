pub mod explore;
pub mod flood;
pub mod follow_wall;
pub mod learner;
pub mod planner;
pub mod session;
pub mod wanderer;

use crate::engine::config::{NavigatorConfig, StrategyKind};
use crate::engine::graph_search::SearchStrategy;
use crate::engine::mdp::MdpError;
use crate::logic::maze::{Direction, Sensors};
use serde::{Deserialize, Serialize};

pub use session::{GoalKind, PathStep, Session};

/// Command for the maze tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Rotate by `rotation` degrees (-90, 0 or 90), then move `movement`
    /// cells forward.
    Move { rotation: i32, movement: i32 },
    /// End the exploration run and return to the start.
    Reset,
}

/// One maze navigation algorithm. The [`Robot`] owns the session and calls
/// into the strategy at fixed points of every step.
pub trait Strategy {
    fn title(&self) -> &'static str;

    /// Whether unknown walls start open in the robot's maze model.
    fn assume_open_walls(&self) -> bool {
        true
    }

    /// Direction to head in next while exploring. The current cell's walls
    /// have already been recorded.
    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction;

    /// Checked every exploration step; `true` ends the exploration run.
    fn can_reset(&mut self, session: &mut Session) -> bool;

    fn on_reached_goal(&mut self, session: &mut Session) {
        if session.goal() == GoalKind::Center {
            session.arrive_at_center();
        }
    }

    /// Last chance to plan with the explored maze before the timed run.
    fn before_reset(&mut self, _session: &Session) -> Result<(), MdpError> {
        Ok(())
    }

    /// Planned direction for the timed run, or `None` to keep exploring.
    fn exploit(&mut self, _session: &Session) -> Result<Option<Direction>, MdpError> {
        Ok(None)
    }
}

pub fn build_strategy(config: &NavigatorConfig) -> Box<dyn Strategy> {
    let seed = config.seed;
    let threshold = config.explore_threshold_pct;
    match config.strategy {
        StrategyKind::RandomTurn => Box::new(wanderer::RandomTurn::new(seed)),
        StrategyKind::BlockDeadend => Box::new(wanderer::BlockDeadend::new(seed)),
        StrategyKind::FollowWall => Box::new(follow_wall::FollowWall::new(seed)),
        StrategyKind::FloodFill => Box::new(flood::FloodFillStrategy::new()),
        StrategyKind::GraphSearchDfs => {
            Box::new(planner::Planner::new(SearchStrategy::DepthFirst, threshold, seed))
        }
        StrategyKind::GraphSearchBfs => {
            Box::new(planner::Planner::new(SearchStrategy::BreadthFirst, threshold, seed))
        }
        StrategyKind::GraphSearchUcs => {
            Box::new(planner::Planner::new(SearchStrategy::UniformCost, threshold, seed))
        }
        StrategyKind::GraphSearchAstar => {
            Box::new(planner::Planner::new(SearchStrategy::AStar, threshold, seed))
        }
        StrategyKind::RlValueIteration => Box::new(learner::ValueIterationStrategy::new(
            &config.learning,
            threshold,
            seed,
        )),
        StrategyKind::RlQLearning => Box::new(learner::QLearningStrategy::new(
            &config.learning,
            threshold,
            seed,
        )),
    }
}

/// Robot driven by a [`Strategy`]: explores on the first run, then races to
/// the center on the second.
pub struct Robot {
    session: Session,
    strategy: Box<dyn Strategy>,
}

impl Robot {
    #[must_use]
    pub fn new(dim: usize, config: &NavigatorConfig) -> Self {
        Self::with_strategy(dim, build_strategy(config))
    }

    #[must_use]
    pub fn with_strategy(dim: usize, strategy: Box<dyn Strategy>) -> Self {
        let session = Session::new(dim, strategy.assume_open_walls());
        log::info!("{} robot in a {dim}x{dim} maze", strategy.title());
        Self { session, strategy }
    }

    pub fn title(&self) -> &'static str {
        self.strategy.title()
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// `sensors` are the left, front and right wall distances after the
    /// previous move.
    pub fn next_move(&mut self, sensors: Sensors) -> Result<Step, MdpError> {
        if self.session.maze_explored() {
            if let Some(direction) = self.strategy.exploit(&self.session)? {
                return Ok(self.session.next_step(direction));
            }
        }
        self.explore(sensors)
    }

    fn explore(&mut self, sensors: Sensors) -> Result<Step, MdpError> {
        self.session.sense(sensors);

        if self.session.has_reached_goal() {
            self.strategy.on_reached_goal(&mut self.session);
        }

        if self.session.run() == 0 && self.strategy.can_reset(&mut self.session) {
            self.strategy.before_reset(&self.session)?;
            self.session.reset();
            return Ok(Step::Reset);
        }

        let direction = self.strategy.choose_next_action(&mut self.session, sensors);
        Ok(self.session.next_step(direction))
    }
}
