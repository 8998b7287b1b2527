use crate::engine::mdp::{Mdp, MdpError};
use crate::logic::maze::{Cell, Direction, MazeModel, WallGrid};

/// Reward for leaving the maze through the goal cell.
pub const EXIT_REWARD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldState {
    Cell(Cell),
    /// Absorbing state entered by `Exit`.
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldAction {
    Move(Direction),
    Exit,
}

/// The explored part of a maze as a deterministic MDP whose only payoff is
/// exiting at `goal`.
#[derive(Debug, Clone, Copy)]
pub struct MazeWorld<'a> {
    model: &'a MazeModel,
    start: Cell,
    goal: Cell,
    living_reward: f64,
}

impl<'a> MazeWorld<'a> {
    pub const fn new(model: &'a MazeModel, start: Cell, goal: Cell) -> Self {
        Self {
            model,
            start,
            goal,
            living_reward: 0.0,
        }
    }

    /// Reward for every ordinary move.
    #[must_use]
    pub const fn with_living_reward(mut self, living_reward: f64) -> Self {
        self.living_reward = living_reward;
        self
    }

    pub const fn goal(&self) -> Cell {
        self.goal
    }
}

impl Mdp for MazeWorld<'_> {
    type State = WorldState;
    type Action = WorldAction;

    fn states(&self) -> Vec<WorldState> {
        let dim = self.model.dim();
        let mut states: Vec<WorldState> = (0..dim)
            .flat_map(|x| (0..dim).map(move |y| Cell::new(x, y)))
            .filter(|&cell| self.model.has_explored(cell))
            .map(WorldState::Cell)
            .collect();
        states.push(WorldState::Terminal);
        states
    }

    fn start_state(&self) -> WorldState {
        WorldState::Cell(self.start)
    }

    fn actions(&self, state: &WorldState) -> Vec<WorldAction> {
        let WorldState::Cell(cell) = *state else {
            return Vec::new();
        };
        if !self.model.has_explored(cell) {
            return Vec::new();
        }
        if cell == self.goal {
            return vec![WorldAction::Exit];
        }
        self.model
            .open_neighbors(cell)
            .into_iter()
            .map(|(direction, _)| WorldAction::Move(direction))
            .collect()
    }

    fn transitions(
        &self,
        state: &WorldState,
        action: WorldAction,
    ) -> Result<Vec<(WorldState, f64)>, MdpError> {
        if !self.actions(state).contains(&action) {
            return Err(MdpError::illegal(state, &action));
        }
        let next = match (*state, action) {
            (_, WorldAction::Exit) => Some(WorldState::Terminal),
            (WorldState::Cell(cell), WorldAction::Move(direction)) => self
                .model
                .neighbor(cell, direction)
                .map(WorldState::Cell),
            (WorldState::Terminal, WorldAction::Move(_)) => None,
        };
        next.map(|next| vec![(next, 1.0)])
            .ok_or_else(|| MdpError::illegal(state, &action))
    }

    fn reward(&self, _state: &WorldState, action: WorldAction, _next: &WorldState) -> f64 {
        match action {
            WorldAction::Exit => EXIT_REWARD,
            WorldAction::Move(_) => self.living_reward,
        }
    }
}
