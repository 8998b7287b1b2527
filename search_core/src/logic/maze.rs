use crate::engine::graph_search::{SearchProblem, Successor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Heading or wall side. `Up` is towards larger `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Bit used for this side in a cell's open-wall mask.
    pub const fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Clockwise quarter turn.
    #[must_use]
    pub const fn right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Right => Self::Up,
            Self::Down => Self::Right,
            Self::Left => Self::Down,
        }
    }

    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Absolute directions of the left, front and right sensors when facing
    /// `self`.
    pub const fn sensor_directions(self) -> [Self; 3] {
        [self.left(), self, self.right()]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn manhattan(a: Cell, b: Cell) -> u64 {
    a.manhattan(b) as u64
}

/// Distances reported by the left, front and right sensors, in cells. Zero
/// means a wall right next to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sensors(pub [u32; 3]);

impl Sensors {
    /// Absolute direction paired with each reading.
    pub fn readings(self, heading: Direction) -> impl Iterator<Item = (Direction, u32)> {
        heading.sensor_directions().into_iter().zip(self.0)
    }

    pub fn openings(self, heading: Direction) -> Vec<Direction> {
        self.readings(heading)
            .filter(|&(_, distance)| distance > 0)
            .map(|(direction, _)| direction)
            .collect()
    }

    pub fn is_dead_end(self) -> bool {
        self.0.iter().all(|&distance| distance == 0)
    }
}

/// Square grid of cells with walls between them. The outer boundary is always
/// walled.
pub trait WallGrid {
    fn dim(&self) -> usize;
    fn has_wall(&self, cell: Cell, direction: Direction) -> bool;

    /// Adjacent cell, ignoring walls. `None` off the edge of the grid.
    fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let dim = self.dim();
        if cell.x >= dim || cell.y >= dim {
            return None;
        }
        match direction {
            Direction::Up if cell.y + 1 < dim => Some(Cell::new(cell.x, cell.y + 1)),
            Direction::Right if cell.x + 1 < dim => Some(Cell::new(cell.x + 1, cell.y)),
            Direction::Down if cell.y > 0 => Some(Cell::new(cell.x, cell.y - 1)),
            Direction::Left if cell.x > 0 => Some(Cell::new(cell.x - 1, cell.y)),
            _ => None,
        }
    }

    /// Neighbours reachable without crossing a wall, in `Direction::ALL` order.
    fn open_neighbors(&self, cell: Cell) -> Vec<(Direction, Cell)> {
        Direction::ALL
            .into_iter()
            .filter(|&direction| !self.has_wall(cell, direction))
            .filter_map(|direction| self.neighbor(cell, direction).map(|n| (direction, n)))
            .collect()
    }
}

/// The four cells in the middle of an even-sized maze.
pub fn goal_room(dim: usize) -> [Cell; 4] {
    let hi = dim / 2;
    let lo = hi.saturating_sub(1);
    [
        Cell::new(lo, hi), // top-left
        Cell::new(hi, hi), // top-right
        Cell::new(hi, lo), // bottom-right
        Cell::new(lo, lo), // bottom-left
    ]
}

pub fn is_goal_room_cell(dim: usize, cell: Cell) -> bool {
    let hi = dim / 2;
    let lo = hi.saturating_sub(1);
    (cell.x == lo || cell.x == hi) && (cell.y == lo || cell.y == hi)
}

/// What the robot believes about the maze so far.
///
/// With `assume_open_walls` every unknown wall is open and sensing closes
/// them; otherwise every unknown wall is closed and sensing opens them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeModel {
    dim: usize,
    open: Vec<[bool; 4]>,
    explored: Vec<bool>,
    assume_open_walls: bool,
}

impl MazeModel {
    #[must_use]
    pub fn new(dim: usize, assume_open_walls: bool) -> Self {
        Self {
            dim,
            open: vec![[assume_open_walls; 4]; dim * dim],
            explored: vec![false; dim * dim],
            assume_open_walls,
        }
    }

    /// Fully known maze from per-cell open-side bitmasks, indexed `[x][y]`.
    pub fn from_masks(masks: &[Vec<u8>]) -> Self {
        let dim = masks.len();
        let mut model = Self::new(dim, false);
        for (x, column) in masks.iter().enumerate() {
            for (y, &mask) in column.iter().enumerate() {
                let cell = Cell::new(x, y);
                for direction in Direction::ALL {
                    if mask & direction.bit() != 0 {
                        model.set_wall(cell, direction, false);
                    }
                }
                model.mark_explored(cell);
            }
        }
        model
    }

    /// Random fully known maze: a spanning tree of the cells carved from the
    /// origin, with the goal room open inside and entered through exactly one
    /// doorway.
    pub fn generate(dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = Self::new(dim, false);
        let room = goal_room(dim);

        for &cell in &room {
            let inside: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&d| model.neighbor(cell, d).is_some_and(|n| room.contains(&n)))
                .collect();
            for direction in inside {
                model.set_wall(cell, direction, false);
            }
        }

        let mut visited: HashSet<Cell> = HashSet::from([Cell::ORIGIN]);
        let mut stack = vec![Cell::ORIGIN];
        while let Some(&cell) = stack.last() {
            let options: Vec<(Direction, Cell)> = Direction::ALL
                .into_iter()
                .filter_map(|d| model.neighbor(cell, d).map(|n| (d, n)))
                .filter(|(_, n)| !visited.contains(n))
                .collect();
            let Some(&(direction, next)) = options.choose(&mut rng) else {
                stack.pop();
                continue;
            };
            model.set_wall(cell, direction, false);
            if room.contains(&next) {
                // The room is a leaf: its other cells are reached from inside
                visited.extend(room);
            } else {
                visited.insert(next);
                stack.push(next);
            }
        }

        for x in 0..dim {
            for y in 0..dim {
                model.mark_explored(Cell::new(x, y));
            }
        }
        model
    }

    pub const fn assume_open_walls(&self) -> bool {
        self.assume_open_walls
    }

    const fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < self.dim && cell.y < self.dim {
            Some(cell.y * self.dim + cell.x)
        } else {
            None
        }
    }

    /// Close (`closed == true`) or open one side of `cell`, and the matching
    /// side of the neighbour that shares it.
    pub fn set_wall(&mut self, cell: Cell, direction: Direction, closed: bool) {
        if let Some(sides) = self.index(cell).and_then(|idx| self.open.get_mut(idx)) {
            if let Some(side) = sides.get_mut(direction.index()) {
                *side = !closed;
            }
        }
        if let Some(neighbor) = self.neighbor(cell, direction) {
            let back = direction.reverse();
            if let Some(sides) = self.index(neighbor).and_then(|idx| self.open.get_mut(idx)) {
                if let Some(side) = sides.get_mut(back.index()) {
                    *side = !closed;
                }
            }
        }
    }

    /// Record what the three sensors see from `cell` while facing `heading`.
    /// Only the readings that contradict the model's default are written.
    pub fn set_walls_from_sensors(&mut self, cell: Cell, heading: Direction, sensors: Sensors) {
        for (direction, distance) in sensors.readings(heading) {
            if self.assume_open_walls && distance == 0 {
                self.set_wall(cell, direction, true);
            }
            if !self.assume_open_walls && distance > 0 {
                self.set_wall(cell, direction, false);
            }
        }
    }

    /// Wall in the three goal-room cells the robot did not enter through, so
    /// that the room has a single doorway.
    pub fn mark_goal_room(&mut self, entered: Cell) {
        let [top_left, top_right, bottom_right, bottom_left] = goal_room(self.dim);
        let sides = [
            (top_left, [Direction::Up, Direction::Left]),
            (top_right, [Direction::Up, Direction::Right]),
            (bottom_right, [Direction::Right, Direction::Down]),
            (bottom_left, [Direction::Down, Direction::Left]),
        ];
        for (cell, directions) in sides {
            if cell == entered {
                continue;
            }
            for direction in directions {
                self.set_wall(cell, direction, true);
            }
        }
    }

    pub fn goal_room(&self) -> [Cell; 4] {
        goal_room(self.dim)
    }

    pub fn is_goal_room_cell(&self, cell: Cell) -> bool {
        is_goal_room_cell(self.dim, cell)
    }

    pub fn has_explored(&self, cell: Cell) -> bool {
        self.index(cell)
            .and_then(|idx| self.explored.get(idx))
            .copied()
            .unwrap_or(false)
    }

    pub fn mark_explored(&mut self, cell: Cell) {
        if let Some(flag) = self.index(cell).and_then(|idx| self.explored.get_mut(idx)) {
            *flag = true;
        }
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|&&flag| flag).count()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn percent_explored(&self) -> f64 {
        if self.explored.is_empty() {
            return 0.0;
        }
        self.explored_count() as f64 / self.explored.len() as f64 * 100.0
    }

    /// Open-side bitmask of `cell` in the text-file encoding.
    pub fn open_mask(&self, cell: Cell) -> u8 {
        Direction::ALL
            .into_iter()
            .filter(|&direction| !self.has_wall(cell, direction))
            .fold(0, |mask, direction| mask | direction.bit())
    }
}

impl WallGrid for MazeModel {
    fn dim(&self) -> usize {
        self.dim
    }

    fn has_wall(&self, cell: Cell, direction: Direction) -> bool {
        if self.neighbor(cell, direction).is_none() {
            return true;
        }
        let open = self
            .index(cell)
            .and_then(|idx| self.open.get(idx))
            .and_then(|sides| sides.get(direction.index()))
            .copied()
            .unwrap_or(false);
        !open
    }
}

/// Shortest route between two cells of a grid. Actions are absolute
/// directions; each step costs `step_cost(destination)`.
pub struct PositionProblem<'a, G> {
    grid: &'a G,
    start: Cell,
    goal: Cell,
    step_cost: fn(Cell) -> u64,
}

impl<'a, G: WallGrid> PositionProblem<'a, G> {
    pub fn new(grid: &'a G, start: Cell, goal: Cell) -> Self {
        Self {
            grid,
            start,
            goal,
            step_cost: |_| 1,
        }
    }

    #[must_use]
    pub fn with_step_cost(mut self, step_cost: fn(Cell) -> u64) -> Self {
        self.step_cost = step_cost;
        self
    }

    pub const fn goal(&self) -> Cell {
        self.goal
    }
}

impl<G: WallGrid> SearchProblem for PositionProblem<'_, G> {
    type State = Cell;
    type Action = Direction;

    fn start_state(&self) -> Cell {
        self.start
    }

    fn is_goal(&self, state: &Cell) -> bool {
        *state == self.goal
    }

    fn successors(&self, state: &Cell) -> Vec<Successor<Cell, Direction>> {
        self.grid
            .open_neighbors(*state)
            .into_iter()
            .map(|(direction, next)| Successor {
                state: next,
                action: direction,
                cost: (self.step_cost)(next),
            })
            .collect()
    }

    /// Manhattan distance. Admissible while every step costs at least 1.
    fn heuristic(&self, state: &Cell) -> u64 {
        manhattan(*state, self.goal)
    }
}
