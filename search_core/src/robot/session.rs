use crate::logic::maze::{Cell, Direction, MazeModel, Sensors, WallGrid};
use crate::robot::Step;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    Center, // Any of the four goal-room cells
    Start,
}

/// One entry of a recorded path: where the robot ended up after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub cell: Cell,
    pub rotation: i32,
    pub heading: Direction,
}

/// Everything the robot knows and counts across its two runs.
#[derive(Debug, Clone)]
pub struct Session {
    model: MazeModel,
    location: Cell,
    heading: Direction,
    goal: GoalKind,
    run: u32,

    // Steps in the current leg, and the length of the last leg in each direction
    run_count: usize,
    count_center: usize,
    count_start: usize,

    path_first: Vec<PathStep>,
    path_current: Vec<PathStep>,
    path_best: Vec<PathStep>,
    path_first_recorded: bool,

    has_reached_center: bool,
    goal_room_marked: bool,
    maze_explored: bool,
    goal_cell: Cell,
}

const START_STEP: PathStep = PathStep {
    cell: Cell::ORIGIN,
    rotation: 0,
    heading: Direction::Up,
};

impl Session {
    #[must_use]
    pub fn new(dim: usize, assume_open_walls: bool) -> Self {
        Self {
            model: MazeModel::new(dim, assume_open_walls),
            location: Cell::ORIGIN,
            heading: Direction::Up,
            goal: GoalKind::Center,
            run: 0,
            run_count: 0,
            count_center: 0,
            count_start: 0,
            path_first: vec![START_STEP],
            path_current: vec![START_STEP],
            path_best: Vec::new(),
            path_first_recorded: false,
            has_reached_center: false,
            goal_room_marked: false,
            maze_explored: false,
            goal_cell: Cell::ORIGIN,
        }
    }

    pub const fn model(&self) -> &MazeModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut MazeModel {
        &mut self.model
    }

    pub fn dim(&self) -> usize {
        self.model.dim()
    }

    pub const fn location(&self) -> Cell {
        self.location
    }

    pub const fn heading(&self) -> Direction {
        self.heading
    }

    pub const fn goal(&self) -> GoalKind {
        self.goal
    }

    pub fn set_goal(&mut self, goal: GoalKind) {
        self.goal = goal;
    }

    /// 0 while exploring, 1 on the timed run.
    pub const fn run(&self) -> u32 {
        self.run
    }

    pub const fn run_count(&self) -> usize {
        self.run_count
    }

    pub const fn count_center(&self) -> usize {
        self.count_center
    }

    pub const fn count_start(&self) -> usize {
        self.count_start
    }

    pub const fn has_reached_center(&self) -> bool {
        self.has_reached_center
    }

    pub const fn maze_explored(&self) -> bool {
        self.maze_explored
    }

    /// Goal-room cell where the center was reached; the origin before that.
    pub const fn goal_cell(&self) -> Cell {
        self.goal_cell
    }

    pub fn path_first(&self) -> &[PathStep] {
        &self.path_first
    }

    pub fn path_current(&self) -> &[PathStep] {
        &self.path_current
    }

    pub fn path_best(&self) -> &[PathStep] {
        &self.path_best
    }

    pub fn percent_explored(&self) -> f64 {
        self.model.percent_explored()
    }

    pub fn has_reached_goal(&self) -> bool {
        match self.goal {
            GoalKind::Center => self.model.is_goal_room_cell(self.location),
            GoalKind::Start => self.location == Cell::ORIGIN,
        }
    }

    /// Record the sensor readings for the current cell the first time the
    /// robot stands in it.
    pub fn sense(&mut self, sensors: Sensors) {
        if !self.model.has_explored(self.location) {
            self.model
                .set_walls_from_sensors(self.location, self.heading, sensors);
            self.model.mark_explored(self.location);
        }
    }

    /// Note arrival in the goal room. The first arrival fixes the goal cell
    /// and walls the room down to the doorway used.
    pub fn arrive_at_center(&mut self) {
        self.has_reached_center = true;
        if !self.goal_room_marked {
            self.goal_room_marked = true;
            self.goal_cell = self.location;
            self.model.mark_goal_room(self.location);
            log::info!("reached the goal room at {}", self.location);
        }
    }

    /// Close the current leg: store its length against the goal just reached
    /// and start counting again.
    pub fn finish_leg(&mut self) {
        match self.goal {
            GoalKind::Center => self.count_center = self.run_count,
            GoalKind::Start => self.count_start = self.run_count,
        }
        self.run_count = 0;
    }

    /// Turn `direction` into a tester command and move the robot's own pose.
    ///
    /// Reversing is a clockwise quarter turn in place, so a U-turn takes two
    /// steps.
    pub fn next_step(&mut self, direction: Direction) -> Step {
        let (rotation, movement) = if direction == self.heading.reverse() {
            self.heading = self.heading.right();
            (90, 0)
        } else {
            let rotation = if direction == self.heading.right() {
                90
            } else if direction == self.heading.left() {
                -90
            } else {
                0
            };
            match self.model.neighbor(self.location, direction) {
                Some(next) => {
                    self.location = next;
                    self.heading = direction;
                    (rotation, 1)
                }
                None => {
                    log::warn!("no cell {direction} of {}, turning in place", self.location);
                    self.heading = direction;
                    (rotation, 0)
                }
            }
        };

        self.record(rotation);
        Step::Move { rotation, movement }
    }

    fn record(&mut self, rotation: i32) {
        self.run_count += 1;

        let step = PathStep {
            cell: self.location,
            rotation,
            heading: self.heading,
        };
        if !self.path_first_recorded {
            self.path_first.push(step);
        }
        self.path_current.push(step);

        if self.has_reached_goal() {
            self.path_first_recorded = true;
            if self.path_best.is_empty() || self.path_current.len() < self.path_best.len() {
                self.path_best.clone_from(&self.path_current);
            }
            self.path_current = vec![step];
        }
    }

    /// Back to the start for the timed run.
    pub fn reset(&mut self) {
        self.run += 1;
        self.location = Cell::ORIGIN;
        self.heading = Direction::Up;
        self.goal = GoalKind::Center;
        self.path_current = vec![START_STEP];
        self.maze_explored = true;
        self.has_reached_center = false;
        self.run_count = 0;
        log::info!(
            "exploration done: {:.1}% explored, starting run {}",
            self.percent_explored(),
            self.run
        );
    }
}
