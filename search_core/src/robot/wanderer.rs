use crate::logic::maze::{Cell, Direction, Sensors};
use crate::robot::explore::{biased_direction, wander};
use crate::robot::{Session, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Random walk with a slight pull towards the goal room and unexplored cells.
/// Turns around at dead ends.
pub struct RandomTurn {
    rng: StdRng,
}

impl RandomTurn {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomTurn {
    fn title(&self) -> &'static str {
        "RANDOM TURN"
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        wander(session, sensors, &mut self.rng)
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        session.has_reached_center()
    }
}

/// Random turn that walls off every dead end it backs out of, so the
/// remaining open corridors converge on the routes between start and goal.
pub struct BlockDeadend {
    rng: StdRng,
    dead_ends: HashSet<Cell>,
}

impl BlockDeadend {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            dead_ends: HashSet::new(),
        }
    }

    pub fn is_dead_end(&self, cell: Cell) -> bool {
        self.dead_ends.contains(&cell)
    }
}

impl Strategy for BlockDeadend {
    fn title(&self) -> &'static str {
        "BLOCK DEADEND"
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        let dead_ends = &self.dead_ends;
        if let Some(direction) =
            biased_direction(session, sensors, &mut self.rng, |cell| dead_ends.contains(&cell))
        {
            return direction;
        }

        let back = session.heading().reverse();
        let here = session.location();
        // Never wall in the start cell
        if here != Cell::ORIGIN {
            session.model_mut().set_wall(here, back, true);
            self.dead_ends.insert(here);
            log::debug!("blocked dead end at {here}");
        }
        back
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        session.has_reached_center()
    }
}
