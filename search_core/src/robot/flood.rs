use crate::engine::flood_fill::FloodFill;
use crate::logic::maze::{goal_room, Cell, Direction, Sensors};
use crate::robot::{GoalKind, Session, Strategy};

/// Flood-fill navigator. Starts from a wall-free model and walks the distance
/// gradient, shuttling between center and start until two consecutive legs
/// take the same number of steps.
#[derive(Debug, Default)]
pub struct FloodFillStrategy {
    fill: Option<FloodFill>,
}

impl FloodFillStrategy {
    #[must_use]
    pub const fn new() -> Self {
        Self { fill: None }
    }

    pub const fn fill(&self) -> Option<&FloodFill> {
        self.fill.as_ref()
    }

    fn seeds(session: &Session) -> Vec<Cell> {
        match session.goal() {
            GoalKind::Center => goal_room(session.dim()).to_vec(),
            GoalKind::Start => vec![Cell::ORIGIN],
        }
    }

    /// Fill whose seeds match the session's current goal. A seed change keeps
    /// the old table until it stops leading anywhere.
    fn fill_for(&mut self, session: &Session) -> &mut FloodFill {
        let seeds = Self::seeds(session);
        let fill = self
            .fill
            .get_or_insert_with(|| FloodFill::new(session.dim(), seeds.clone()));
        if fill.seeds() != seeds.as_slice() {
            fill.set_seeds(seeds);
        }
        fill
    }
}

impl Strategy for FloodFillStrategy {
    fn title(&self) -> &'static str {
        "FLOOD FILL"
    }

    fn choose_next_action(&mut self, session: &mut Session, _sensors: Sensors) -> Direction {
        let (location, heading) = (session.location(), session.heading());
        self.fill_for(session)
            .best_direction(session.model(), location)
            .unwrap_or_else(|| heading.reverse())
    }

    fn can_reset(&mut self, session: &mut Session) -> bool {
        session.has_reached_center() && session.count_center() == session.count_start()
    }

    fn on_reached_goal(&mut self, session: &mut Session) {
        if session.goal() == GoalKind::Center {
            session.arrive_at_center();
        }
        session.finish_leg();
        if session.count_center() == session.count_start() {
            return;
        }

        let next = match session.goal() {
            GoalKind::Center => GoalKind::Start,
            GoalKind::Start => GoalKind::Center,
        };
        session.set_goal(next);
        log::info!(
            "flood fill: heading for {next:?} (center leg {}, start leg {})",
            session.count_center(),
            session.count_start()
        );
        self.fill_for(session).propagate(session.model());
    }
}
