use crate::maze::Maze;
use search_core::engine::mdp::MdpError;
use search_core::logic::maze::{Cell, Direction};
use search_core::robot::{Robot, Step};
use serde::Serialize;

pub const MAX_TIME: usize = 1000;
pub const TRAIN_SCORE_MULT: f64 = 1.0 / 30.0;
const MAX_MOVEMENT: i32 = 3;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialReport {
    /// Time steps of each finished run. The first includes the reset.
    pub runtimes: Vec<usize>,
    pub total_time: usize,
    pub refused_resets: usize,
    pub blocked_moves: usize,
}

impl TrialReport {
    pub fn completed(&self) -> bool {
        self.runtimes.len() == 2
    }

    /// Second run plus a thirtieth of the first.
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> Option<f64> {
        match self.runtimes.as_slice() {
            [first, second] => Some(*second as f64 + *first as f64 * TRAIN_SCORE_MULT),
            _ => None,
        }
    }
}

/// Robot pose as the tester tracks it, independent of what the robot
/// believes.
#[derive(Debug, Clone, Copy)]
struct Pose {
    location: Cell,
    heading: Direction,
}

impl Pose {
    const START: Self = Self {
        location: Cell::ORIGIN,
        heading: Direction::Up,
    };
}

/// Two-run trial: explore and reset, then race to the goal room. Both runs
/// share one time budget.
pub struct Tester<'a> {
    maze: &'a Maze,
    max_time: usize,
}

impl<'a> Tester<'a> {
    pub const fn new(maze: &'a Maze) -> Self {
        Self {
            maze,
            max_time: MAX_TIME,
        }
    }

    #[must_use]
    pub const fn with_max_time(mut self, max_time: usize) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn run(&self, robot: &mut Robot) -> Result<TrialReport, MdpError> {
        let mut report = TrialReport::default();

        'runs: for run in 0..2 {
            let mut pose = Pose::START;
            let mut hit_goal = false;

            loop {
                report.total_time += 1;
                if report.total_time > self.max_time {
                    tracing::warn!(run, max_time = self.max_time, "allotted time exceeded");
                    break 'runs;
                }

                let sensors = self.maze.sensors(pose.location, pose.heading);
                let (rotation, movement) = match robot.next_move(sensors)? {
                    Step::Reset if run == 0 && hit_goal => {
                        report.runtimes.push(report.total_time);
                        tracing::info!(steps = report.total_time, "ending first run");
                        continue 'runs;
                    }
                    Step::Reset => {
                        report.refused_resets += 1;
                        tracing::warn!(run, hit_goal, "reset refused");
                        continue;
                    }
                    Step::Move { rotation, movement } => (rotation, movement),
                };

                pose.heading = match rotation {
                    90 => pose.heading.right(),
                    -90 => pose.heading.left(),
                    0 => pose.heading,
                    other => {
                        tracing::warn!(rotation = other, "invalid rotation, staying put");
                        pose.heading
                    }
                };
                self.drive(&mut pose, movement, &mut report);

                if self.maze.is_goal(pose.location) {
                    hit_goal = true;
                    if run != 0 {
                        let first: usize = report.runtimes.iter().sum();
                        report.runtimes.push(report.total_time - first);
                        tracing::info!(run, steps = report.total_time - first, "goal found");
                        break 'runs;
                    }
                }
            }
        }

        Ok(report)
    }

    // Up to three cells forwards or backwards; a wall stops the rest.
    fn drive(&self, pose: &mut Pose, movement: i32, report: &mut TrialReport) {
        let movement = movement.clamp(-MAX_MOVEMENT, MAX_MOVEMENT);
        let direction = if movement < 0 {
            pose.heading.reverse()
        } else {
            pose.heading
        };
        for _ in 0..movement.unsigned_abs() {
            match self.maze.step(pose.location, direction) {
                Some(next) => pose.location = next,
                None => {
                    report.blocked_moves += 1;
                    tracing::debug!(cell = %pose.location, %direction, "movement stopped by wall");
                    break;
                }
            }
        }
    }
}
