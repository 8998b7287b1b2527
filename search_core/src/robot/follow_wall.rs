use crate::logic::maze::{Cell, Direction, Sensors};
use crate::robot::{Session, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Wall follower: keeps one hand on the wall. The goal room is not attached
/// to the outer wall, so this never resets; every return to the start picks a
/// new hand.
pub struct FollowWall {
    hand: Direction, // Left or Right
    rng: StdRng,
}

impl FollowWall {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let hand = pick_hand(&mut rng);
        Self { hand, rng }
    }

    pub const fn hand(&self) -> Direction {
        self.hand
    }
}

fn pick_hand(rng: &mut StdRng) -> Direction {
    if rng.gen_bool(0.5) {
        Direction::Left
    } else {
        Direction::Right
    }
}

impl Strategy for FollowWall {
    fn title(&self) -> &'static str {
        "FOLLOW WALL"
    }

    fn choose_next_action(&mut self, session: &mut Session, sensors: Sensors) -> Direction {
        let heading = session.heading();
        let openings = sensors.openings(heading);
        if openings.is_empty() {
            return heading.reverse();
        }

        let (hand_side, other_side) = if self.hand == Direction::Right {
            (heading.right(), heading.left())
        } else {
            (heading.left(), heading.right())
        };
        if openings.contains(&hand_side) {
            hand_side
        } else if openings.contains(&heading) {
            heading
        } else {
            other_side
        }
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        if session.location() == Cell::ORIGIN {
            session.model_mut().set_wall(Cell::ORIGIN, Direction::Down, true);
            self.hand = pick_hand(&mut self.rng);
        }
        false
    }
}
