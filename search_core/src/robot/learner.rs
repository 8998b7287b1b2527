use crate::engine::config::LearningConfig;
use crate::engine::mdp::{Mdp, MdpEnvironment, MdpError, ValueIteration};
use crate::engine::q_learning::QLearningAgent;
use crate::engine::table::{PolicyStore, ValueTable};
use crate::logic::maze::{Cell, Direction, Sensors};
use crate::logic::maze_world::{MazeWorld, WorldAction, WorldState};
use crate::robot::explore::wander;
use crate::robot::{Session, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ready_to_plan(session: &Session, threshold_pct: f64) -> bool {
    session.has_reached_center() && session.percent_explored() >= threshold_pct
}

fn maze_world<'a>(session: &'a Session, config: &LearningConfig) -> MazeWorld<'a> {
    MazeWorld::new(session.model(), Cell::ORIGIN, session.goal_cell())
        .with_living_reward(config.living_reward)
}

const fn direction_of(action: Option<WorldAction>) -> Option<Direction> {
    match action {
        Some(WorldAction::Move(direction)) => Some(direction),
        Some(WorldAction::Exit) | None => None,
    }
}

/// Solves the explored maze as an MDP with value iteration and follows the
/// greedy policy on the timed run.
pub struct ValueIterationStrategy {
    config: LearningConfig,
    explore_threshold_pct: f64,
    rng: StdRng,
    values: Option<ValueTable<WorldState>>,
    policy: PolicyStore<WorldState, WorldAction>,
}

impl ValueIterationStrategy {
    #[must_use]
    pub fn new(config: &LearningConfig, explore_threshold_pct: f64, seed: u64) -> Self {
        Self {
            config: config.clone(),
            explore_threshold_pct,
            rng: StdRng::seed_from_u64(seed),
            values: None,
            policy: PolicyStore::new(),
        }
    }

    pub const fn values(&self) -> Option<&ValueTable<WorldState>> {
        self.values.as_ref()
    }
}

impl Strategy for ValueIterationStrategy {
    fn title(&self) -> &'static str {
        "REINFORCEMENT LEARNING: VALUE ITERATION"
    }

    fn assume_open_walls(&self) -> bool {
        false
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        wander(session, sensors, &mut self.rng)
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        ready_to_plan(session, self.explore_threshold_pct)
    }

    fn before_reset(&mut self, session: &Session) -> Result<(), MdpError> {
        let world = maze_world(session, &self.config);
        let report = ValueIteration::from_config(&self.config).solve(&world)?;
        log::info!(
            "value of the start cell {:.4} after {} sweeps",
            report.values.get(&world.start_state()),
            report.sweeps
        );
        self.values = Some(report.values);
        self.policy.invalidate();
        Ok(())
    }

    fn exploit(&mut self, session: &Session) -> Result<Option<Direction>, MdpError> {
        let Some(values) = &self.values else {
            return Ok(None);
        };
        let world = maze_world(session, &self.config);
        let solver = ValueIteration::from_config(&self.config);
        let state = WorldState::Cell(session.location());
        let action = self
            .policy
            .get_or_try_insert_with(&state, || solver.greedy_action(&world, values, &state))?;
        Ok(direction_of(action))
    }
}

/// Learns the explored maze by Q-learning episodes against a simulated copy
/// of it, then follows the greedy policy on the timed run.
pub struct QLearningStrategy {
    config: LearningConfig,
    explore_threshold_pct: f64,
    seed: u64,
    rng: StdRng,
    agent: Option<QLearningAgent<WorldState, WorldAction>>,
    policy: PolicyStore<WorldState, WorldAction>,
}

impl QLearningStrategy {
    #[must_use]
    pub fn new(config: &LearningConfig, explore_threshold_pct: f64, seed: u64) -> Self {
        Self {
            config: config.clone(),
            explore_threshold_pct,
            seed,
            rng: StdRng::seed_from_u64(seed),
            agent: None,
            policy: PolicyStore::new(),
        }
    }

    pub const fn agent(&self) -> Option<&QLearningAgent<WorldState, WorldAction>> {
        self.agent.as_ref()
    }
}

impl Strategy for QLearningStrategy {
    fn title(&self) -> &'static str {
        "REINFORCEMENT LEARNING: Q-LEARNING"
    }

    fn assume_open_walls(&self) -> bool {
        false
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        wander(session, sensors, &mut self.rng)
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        ready_to_plan(session, self.explore_threshold_pct)
    }

    fn before_reset(&mut self, session: &Session) -> Result<(), MdpError> {
        let world = maze_world(session, &self.config);
        let mut env = MdpEnvironment::new(&world, self.seed);
        let mut agent = QLearningAgent::from_config(&self.config, self.seed);
        agent.train(
            &mut env,
            self.config.episodes,
            self.config.max_steps_per_episode,
        )?;
        // Training is over: act greedily from here on
        agent.set_epsilon(0.0);
        self.agent = Some(agent);
        self.policy.invalidate();
        Ok(())
    }

    fn exploit(&mut self, session: &Session) -> Result<Option<Direction>, MdpError> {
        let Some(agent) = self.agent.as_mut() else {
            return Ok(None);
        };
        let world = maze_world(session, &self.config);
        let state = WorldState::Cell(session.location());
        let actions = world.actions(&state);
        let action = self.policy.get_or_try_insert_with(&state, || {
            Ok::<_, MdpError>(agent.greedy_action(&state, &actions))
        })?;
        Ok(direction_of(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::maze::WallGrid;

    /// 4x4 session with every cell explored and the corridor
    /// (0,0) -> (0,1) -> (0,2) -> (1,2) open; everything else walled.
    fn corridor_session() -> Session {
        let mut session = Session::new(4, false);
        let model = session.model_mut();
        model.set_wall(Cell::ORIGIN, Direction::Up, false);
        model.set_wall(Cell::new(0, 1), Direction::Up, false);
        model.set_wall(Cell::new(0, 2), Direction::Right, false);
        for x in 0..4 {
            for y in 0..4 {
                model.mark_explored(Cell::new(x, y));
            }
        }
        session
    }

    fn drive_to_center(session: &mut Session, strategy: &mut dyn Strategy) {
        session.next_step(Direction::Up);
        session.next_step(Direction::Up);
        session.next_step(Direction::Right);
        assert!(session.has_reached_goal());
        strategy.on_reached_goal(session);
    }

    fn replay(session: &mut Session, strategy: &mut dyn Strategy) -> usize {
        let mut steps = 0;
        while !session.has_reached_goal() && steps < 20 {
            let direction = strategy.exploit(session).unwrap().unwrap();
            session.next_step(direction);
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_value_iteration_follows_corridor() {
        let mut strategy = ValueIterationStrategy::new(&LearningConfig::default(), 80.0, 0);
        let mut session = corridor_session();
        drive_to_center(&mut session, &mut strategy);
        assert_eq!(session.goal_cell(), Cell::new(1, 2));
        assert!(strategy.can_reset(&mut session));

        strategy.before_reset(&session).unwrap();
        session.reset();
        assert!(session.model().has_wall(Cell::ORIGIN, Direction::Right));
        assert_eq!(replay(&mut session, &mut strategy), 3);
        assert_eq!(session.location(), Cell::new(1, 2));
    }

    #[test]
    fn test_q_learning_follows_corridor() {
        let config = LearningConfig {
            episodes: 200,
            ..LearningConfig::default()
        };
        let mut strategy = QLearningStrategy::new(&config, 80.0, 5);
        let mut session = corridor_session();
        drive_to_center(&mut session, &mut strategy);

        strategy.before_reset(&session).unwrap();
        assert_eq!(strategy.agent().map(QLearningAgent::episodes), Some(200));
        session.reset();
        assert_eq!(replay(&mut session, &mut strategy), 3);
    }

    #[test]
    fn test_no_plan_before_reset() {
        let mut strategy = ValueIterationStrategy::new(&LearningConfig::default(), 80.0, 0);
        let session = corridor_session();
        assert!(strategy.values().is_none());
        assert_eq!(strategy.exploit(&session).unwrap(), None);
    }
}
