use crate::logic::maze::{Cell, Direction, Sensors, WallGrid};
use crate::robot::Session;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Random sensed opening, preferring one into the goal room, then one into an
/// unexplored cell. Openings leading to a cell for which `avoid` holds are
/// ignored. `None` when nothing is left.
pub fn biased_direction(
    session: &Session,
    sensors: Sensors,
    rng: &mut StdRng,
    avoid: impl Fn(Cell) -> bool,
) -> Option<Direction> {
    let model = session.model();
    let mut goal_room = Vec::new();
    let mut unexplored = Vec::new();
    let mut openings = Vec::new();

    for direction in sensors.openings(session.heading()) {
        let Some(neighbor) = model.neighbor(session.location(), direction) else {
            continue;
        };
        if avoid(neighbor) {
            continue;
        }
        openings.push(direction);
        if model.is_goal_room_cell(neighbor) {
            goal_room.push(direction);
        }
        if !model.has_explored(neighbor) {
            unexplored.push(direction);
        }
    }

    [goal_room, unexplored, openings]
        .iter()
        .find(|candidates| !candidates.is_empty())
        .and_then(|candidates| candidates.choose(rng).copied())
}

/// [`biased_direction`] that stays out of the goal room once it has been
/// reached, turning around when there is no opening.
pub fn wander(session: &Session, sensors: Sensors, rng: &mut StdRng) -> Direction {
    let reached = session.has_reached_center();
    let model = session.model();
    biased_direction(session, sensors, rng, |cell| {
        reached && model.is_goal_room_cell(cell)
    })
    .unwrap_or_else(|| session.heading().reverse())
}
