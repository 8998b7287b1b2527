use crate::engine::config::LearningConfig;
use crate::engine::table::ValueTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdpError {
    /// The action is not among `actions(state)`.
    IllegalAction { state: String, action: String },
}

impl MdpError {
    pub fn illegal(state: &impl Debug, action: &impl Debug) -> Self {
        Self::IllegalAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }
}

impl fmt::Display for MdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalAction { state, action } => {
                write!(f, "illegal action {action} in state {state}")
            }
        }
    }
}

impl std::error::Error for MdpError {}

/// Markov decision process with a finite state set.
pub trait Mdp {
    type State: Clone + Eq + Hash + Debug;
    type Action: Copy + Eq + Hash + Debug;

    fn states(&self) -> Vec<Self::State>;
    fn start_state(&self) -> Self::State;
    /// Empty for terminal states.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;
    /// `(next_state, probability)` pairs summing to 1.
    fn transitions(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<Vec<(Self::State, f64)>, MdpError>;
    fn reward(&self, state: &Self::State, action: Self::Action, next: &Self::State) -> f64;

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.actions(state).is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SolveReport<S> {
    pub values: ValueTable<S>,
    pub sweeps: usize,
    /// Largest value change in the last sweep.
    pub residual: f64,
}

impl<S> SolveReport<S> {
    pub fn converged_within(&self, tolerance: f64) -> bool {
        self.residual < tolerance
    }
}

/// Batch value iteration with synchronous sweeps.
#[derive(Debug, Clone, Copy)]
pub struct ValueIteration {
    discount: f64,
    iterations: usize,
    tolerance: Option<f64>,
}

impl ValueIteration {
    #[must_use]
    pub const fn new(discount: f64, iterations: usize) -> Self {
        Self {
            discount,
            iterations,
            tolerance: None,
        }
    }

    /// Stop early once a sweep changes no value by `tolerance` or more.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub const fn from_config(config: &LearningConfig) -> Self {
        Self {
            discount: config.discount,
            iterations: config.iterations,
            tolerance: config.tolerance,
        }
    }

    pub const fn discount(&self) -> f64 {
        self.discount
    }

    pub fn solve<M: Mdp>(&self, mdp: &M) -> Result<SolveReport<M::State>, MdpError> {
        let states = mdp.states();
        let mut values: ValueTable<M::State> = ValueTable::new();
        let mut sweeps = 0;
        let mut residual = 0.0;

        while sweeps < self.iterations {
            let mut next = ValueTable::new();
            for state in &states {
                let mut best: Option<f64> = None;
                for action in mdp.actions(state) {
                    let q = self.q_value(mdp, &values, state, action)?;
                    if beats(best, q) {
                        best = Some(q);
                    }
                }
                next.set(state.clone(), best.unwrap_or(0.0));
            }
            residual = next.max_abs_diff(&values);
            values = next;
            sweeps += 1;

            if self.tolerance.is_some_and(|tolerance| residual < tolerance) {
                break;
            }
        }

        log::info!(
            "value iteration: {} states, {} sweeps, residual {:.3e}",
            states.len(),
            sweeps,
            residual
        );
        Ok(SolveReport {
            values,
            sweeps,
            residual,
        })
    }

    /// Expected discounted return of taking `action` in `state` and then
    /// following `values`.
    pub fn q_value<M: Mdp>(
        &self,
        mdp: &M,
        values: &ValueTable<M::State>,
        state: &M::State,
        action: M::Action,
    ) -> Result<f64, MdpError> {
        let transitions = mdp.transitions(state, action)?;
        Ok(transitions
            .iter()
            .map(|(next, probability)| {
                probability * (mdp.reward(state, action, next) + self.discount * values.get(next))
            })
            .sum())
    }

    /// Best action under `values`; the first of several equal ones wins.
    /// `None` for terminal states.
    pub fn greedy_action<M: Mdp>(
        &self,
        mdp: &M,
        values: &ValueTable<M::State>,
        state: &M::State,
    ) -> Result<Option<M::Action>, MdpError> {
        let mut best: Option<(f64, M::Action)> = None;
        for action in mdp.actions(state) {
            let q = self.q_value(mdp, values, state, action)?;
            if beats(best.map(|(b, _)| b), q) {
                best = Some((q, action));
            }
        }
        Ok(best.map(|(_, action)| action))
    }

    pub fn extract_policy<M: Mdp>(
        &self,
        mdp: &M,
        values: &ValueTable<M::State>,
    ) -> Result<HashMap<M::State, M::Action>, MdpError> {
        let mut policy = HashMap::new();
        for state in mdp.states() {
            if let Some(action) = self.greedy_action(mdp, values, &state)? {
                policy.insert(state, action);
            }
        }
        Ok(policy)
    }
}

fn beats(best: Option<f64>, q: f64) -> bool {
    match best {
        Some(best) => q > best,
        None => true,
    }
}

/// Something an agent acts in, one transition at a time.
pub trait Environment {
    type State: Clone + Eq + Hash + Debug;
    type Action: Copy + Eq + Hash + Debug;

    /// Back to the start state, which is returned.
    fn reset(&mut self) -> Self::State;
    fn current_state(&self) -> Self::State;
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;
    /// Apply `action` in the current state; returns the new state and the
    /// reward collected.
    fn step(&mut self, action: Self::Action) -> Result<(Self::State, f64), MdpError>;
}

/// Runs an [`Mdp`] as an [`Environment`] by sampling its transitions.
pub struct MdpEnvironment<'a, M: Mdp> {
    mdp: &'a M,
    state: M::State,
    rng: StdRng,
}

impl<'a, M: Mdp> MdpEnvironment<'a, M> {
    pub fn new(mdp: &'a M, seed: u64) -> Self {
        Self {
            mdp,
            state: mdp.start_state(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<M: Mdp> Environment for MdpEnvironment<'_, M> {
    type State = M::State;
    type Action = M::Action;

    fn reset(&mut self) -> M::State {
        self.state = self.mdp.start_state();
        self.state.clone()
    }

    fn current_state(&self) -> M::State {
        self.state.clone()
    }

    fn actions(&self, state: &M::State) -> Vec<M::Action> {
        self.mdp.actions(state)
    }

    fn step(&mut self, action: M::Action) -> Result<(M::State, f64), MdpError> {
        let transitions = self.mdp.transitions(&self.state, action)?;
        let Some((fallback, _)) = transitions.last() else {
            return Err(MdpError::illegal(&self.state, &action));
        };

        let roll: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        let mut next = fallback.clone();
        for (candidate, probability) in &transitions {
            cumulative += probability;
            if roll < cumulative {
                next = candidate.clone();
                break;
            }
        }

        let reward = self.mdp.reward(&self.state, action, &next);
        self.state = next.clone();
        Ok((next, reward))
    }
}
