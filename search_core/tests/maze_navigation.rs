use search_core::engine::config::{LearningConfig, NavigatorConfig, StrategyKind};
use search_core::engine::flood_fill::flood_fill;
use search_core::logic::maze::{Cell, Direction, MazeModel, Sensors, WallGrid};
use search_core::robot::{Robot, Step};

/// The true maze as the robot's sensors see it.
struct Simulator<'a> {
    maze: &'a MazeModel,
    location: Cell,
    heading: Direction,
}

impl<'a> Simulator<'a> {
    fn new(maze: &'a MazeModel) -> Self {
        Self {
            maze,
            location: Cell::ORIGIN,
            heading: Direction::Up,
        }
    }

    fn distance(&self, direction: Direction) -> u32 {
        let mut cell = self.location;
        let mut distance = 0;
        while !self.maze.has_wall(cell, direction) {
            let Some(next) = self.maze.neighbor(cell, direction) else {
                break;
            };
            cell = next;
            distance += 1;
        }
        distance
    }

    fn sensors(&self) -> Sensors {
        Sensors(self.heading.sensor_directions().map(|d| self.distance(d)))
    }

    fn apply(&mut self, rotation: i32, movement: i32) {
        self.heading = match rotation {
            90 => self.heading.right(),
            -90 => self.heading.left(),
            _ => self.heading,
        };
        for _ in 0..movement.clamp(0, 3) {
            if self.maze.has_wall(self.location, self.heading) {
                break;
            }
            if let Some(next) = self.maze.neighbor(self.location, self.heading) {
                self.location = next;
            }
        }
    }

    fn reset(&mut self) {
        self.location = Cell::ORIGIN;
        self.heading = Direction::Up;
    }
}

/// Steps taken on the exploration run and on the timed run.
fn run_trial(maze: &MazeModel, config: &NavigatorConfig, step_cap: usize) -> (usize, usize) {
    let mut robot = Robot::new(maze.dim(), config);
    let mut sim = Simulator::new(maze);
    let mut steps = [0, 0];
    let mut run = 0;

    while run < 2 {
        assert!(
            steps[run] < step_cap,
            "{} stuck on run {run} at {}",
            robot.title(),
            sim.location
        );
        match robot.next_move(sim.sensors()).unwrap() {
            Step::Reset => {
                assert_eq!(run, 0, "reset on the timed run");
                sim.reset();
                run = 1;
                assert_eq!(robot.session().run(), 1);
            }
            Step::Move { rotation, movement } => {
                sim.apply(rotation, movement);
                steps[run] += 1;
                assert_eq!(robot.session().location(), sim.location);
                assert_eq!(robot.session().heading(), sim.heading);
                if run == 1 && maze.is_goal_room_cell(sim.location) {
                    run = 2;
                }
            }
        }
    }
    (steps[0], steps[1])
}

fn shortest_to_center(maze: &MazeModel) -> usize {
    flood_fill(maze, &maze.goal_room()).get(Cell::ORIGIN) as usize
}

fn config(strategy: StrategyKind, seed: u64) -> NavigatorConfig {
    NavigatorConfig {
        strategy,
        seed,
        ..NavigatorConfig::default()
    }
}

#[test]
fn test_flood_fill_reaches_center_twice() {
    for seed in 0..4 {
        let maze = MazeModel::generate(8, seed);
        let (first, second) = run_trial(&maze, &config(StrategyKind::FloodFill, seed), 1000);
        assert!(second >= shortest_to_center(&maze), "seed {seed}");
        assert!(second <= first, "seed {seed}: {second} vs {first}");
    }
}

#[test]
fn test_graph_search_replays_shortest_route() {
    let maze = MazeModel::generate(6, 3);
    let shortest = shortest_to_center(&maze);
    for strategy in [
        StrategyKind::GraphSearchDfs,
        StrategyKind::GraphSearchBfs,
        StrategyKind::GraphSearchUcs,
        StrategyKind::GraphSearchAstar,
    ] {
        let (_, second) = run_trial(&maze, &config(strategy, 7), 2000);
        // Every route in a perfect maze is the shortest one
        assert_eq!(second, shortest, "{strategy:?}");
    }
}

#[test]
fn test_value_iteration_replays_shortest_route() {
    let maze = MazeModel::generate(6, 4);
    let (_, second) = run_trial(&maze, &config(StrategyKind::RlValueIteration, 2), 2000);
    assert_eq!(second, shortest_to_center(&maze));
}

#[test]
fn test_q_learning_reaches_center() {
    let maze = MazeModel::generate(6, 5);
    let navigator = NavigatorConfig {
        learning: LearningConfig {
            episodes: 500,
            ..LearningConfig::default()
        },
        ..config(StrategyKind::RlQLearning, 6)
    };
    let (_, second) = run_trial(&maze, &navigator, 2000);
    assert!(second >= shortest_to_center(&maze));
}

#[test]
fn test_exploring_robots_learn_walls_from_sensors() {
    let maze = MazeModel::generate(6, 8);
    let mut robot = Robot::new(6, &config(StrategyKind::GraphSearchBfs, 1));
    let mut sim = Simulator::new(&maze);
    for _ in 0..50 {
        if let Step::Move { rotation, movement } = robot.next_move(sim.sensors()).unwrap() {
            sim.apply(rotation, movement);
        }
    }

    // Whatever the closed model has opened must really be open
    let model = robot.session().model();
    for x in 0..6 {
        for y in 0..6 {
            let cell = Cell::new(x, y);
            for direction in Direction::ALL {
                if !model.has_wall(cell, direction) {
                    assert!(!maze.has_wall(cell, direction), "{cell} {direction}");
                }
            }
        }
    }
    assert!(model.explored_count() > 1);
}
