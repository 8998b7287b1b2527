use crate::engine::config::LearningConfig;
use crate::engine::mdp::{Environment, MdpError};
use crate::engine::table::ValueTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    /// Whether the episode ended in a state with no actions, rather than on
    /// the step cap.
    pub finished: bool,
}

/// Tabular Q-learning with epsilon-greedy exploration.
#[derive(Debug, Clone)]
pub struct QLearningAgent<S, A> {
    q_values: ValueTable<(S, A)>,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    alpha_decay: f64,
    min_alpha: f64,
    episodes: usize,
    rng: StdRng,
}

impl<S: Clone + Eq + Hash, A: Copy + Eq + Hash> QLearningAgent<S, A> {
    pub fn new(alpha: f64, gamma: f64, epsilon: f64, seed: u64) -> Self {
        Self {
            q_values: ValueTable::new(),
            alpha,
            gamma,
            epsilon,
            alpha_decay: 1.0,
            min_alpha: 0.0,
            episodes: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &LearningConfig, seed: u64) -> Self {
        let mut agent = Self::new(config.alpha, config.gamma, config.epsilon, seed);
        agent.alpha_decay = config.alpha_decay;
        agent.min_alpha = config.min_alpha;
        agent
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub const fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn q_value(&self, state: &S, action: A) -> f64 {
        self.q_values.get(&(state.clone(), action))
    }

    /// `max_a Q(state, a)`, or `0.0` when there are no actions.
    pub fn value(&self, state: &S, actions: &[A]) -> f64 {
        actions
            .iter()
            .map(|&action| self.q_value(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Action with the highest Q-value; ties are broken at random.
    pub fn greedy_action(&mut self, state: &S, actions: &[A]) -> Option<A> {
        let best = self.value(state, actions);
        let tied: Vec<A> = actions
            .iter()
            .copied()
            .filter(|&action| (self.q_value(state, action) - best).abs() < f64::EPSILON)
            .collect();
        tied.choose(&mut self.rng).copied()
    }

    /// Random action with probability epsilon, otherwise the greedy one.
    pub fn choose_action(&mut self, state: &S, actions: &[A]) -> Option<A> {
        if actions.is_empty() {
            return None;
        }
        if self.rng.gen_bool(self.epsilon.clamp(0.0, 1.0)) {
            return actions.choose(&mut self.rng).copied();
        }
        self.greedy_action(state, actions)
    }

    /// One temporal-difference update towards
    /// `reward + gamma * max_a' Q(next, a')`.
    pub fn update(&mut self, state: &S, action: A, next: &S, next_actions: &[A], reward: f64) {
        let current = self.q_value(state, action);
        let target = reward + self.gamma * self.value(next, next_actions);
        self.q_values
            .set((state.clone(), action), current + self.alpha * (target - current));
    }

    pub fn run_episode<E>(
        &mut self,
        env: &mut E,
        max_steps: usize,
    ) -> Result<EpisodeReport, MdpError>
    where
        E: Environment<State = S, Action = A>,
    {
        let mut state = env.reset();
        let mut steps = 0;
        let mut total_reward = 0.0;
        let mut finished = false;

        while steps < max_steps {
            let actions = env.actions(&state);
            let Some(action) = self.choose_action(&state, &actions) else {
                finished = true;
                break;
            };
            let (next, reward) = env.step(action)?;
            let next_actions = env.actions(&next);
            self.update(&state, action, &next, &next_actions, reward);

            total_reward += reward;
            steps += 1;
            state = next;
        }
        if !finished {
            finished = env.actions(&state).is_empty();
        }

        self.episodes += 1;
        self.alpha = (self.alpha * self.alpha_decay).max(self.min_alpha);

        let report = EpisodeReport {
            episode: self.episodes,
            steps,
            total_reward,
            finished,
        };
        log::trace!(
            "episode {}: {} steps, reward {:.3}, alpha {:.4}",
            report.episode,
            report.steps,
            report.total_reward,
            self.alpha
        );
        Ok(report)
    }

    pub fn train<E>(
        &mut self,
        env: &mut E,
        episodes: usize,
        max_steps: usize,
    ) -> Result<Vec<EpisodeReport>, MdpError>
    where
        E: Environment<State = S, Action = A>,
    {
        let reports = (0..episodes)
            .map(|_| self.run_episode(env, max_steps))
            .collect::<Result<Vec<_>, _>>()?;
        let finished = reports.iter().filter(|report| report.finished).count();
        log::info!(
            "q-learning: {} episodes ({} finished), {} q-values",
            episodes,
            finished,
            self.q_values.len()
        );
        Ok(reports)
    }
}
