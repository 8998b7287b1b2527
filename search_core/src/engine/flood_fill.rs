use crate::logic::maze::{Cell, Direction, WallGrid};
use std::collections::VecDeque;

/// Distance of a cell no seed can reach.
pub const UNREACHED: u32 = u32::MAX;

/// Open-path distance from every cell to the nearest seed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    dim: usize,
    distances: Vec<u32>,
}

impl DistanceTable {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            distances: vec![UNREACHED; dim * dim],
        }
    }

    pub const fn dim(&self) -> usize {
        self.dim
    }

    const fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < self.dim && cell.y < self.dim {
            Some(cell.y * self.dim + cell.x)
        } else {
            None
        }
    }

    /// `UNREACHED` for unreached and off-grid cells.
    pub fn get(&self, cell: Cell) -> u32 {
        self.index(cell)
            .and_then(|idx| self.distances.get(idx))
            .copied()
            .unwrap_or(UNREACHED)
    }

    fn set(&mut self, cell: Cell, distance: u32) {
        if let Some(slot) = self.index(cell).and_then(|idx| self.distances.get_mut(idx)) {
            *slot = distance;
        }
    }

    /// Rows from the top (`y = dim - 1`) down, the way the maze is drawn.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.distances.chunks(self.dim.max(1)).rev()
    }
}

/// Breadth-first relaxation from `seeds` over open passages.
pub fn flood_fill<G: WallGrid>(grid: &G, seeds: &[Cell]) -> DistanceTable {
    let mut table = DistanceTable::new(grid.dim());
    let mut queue = VecDeque::new();

    for &seed in seeds {
        if table.index(seed).is_some() {
            table.set(seed, 0);
            queue.push_back(seed);
        }
    }

    while let Some(cell) = queue.pop_front() {
        let next = table.get(cell).saturating_add(1);
        for (_, neighbor) in grid.open_neighbors(cell) {
            if next < table.get(neighbor) {
                table.set(neighbor, next);
                queue.push_back(neighbor);
            }
        }
    }
    table
}

/// Flood-fill navigator: keeps the distance table for the current seed set
/// and walks it downhill.
#[derive(Debug, Clone)]
pub struct FloodFill {
    seeds: Vec<Cell>,
    table: DistanceTable,
    propagations: usize,
}

impl FloodFill {
    /// Starts with every cell unreached; the first `best_direction` call
    /// propagates.
    #[must_use]
    pub fn new(dim: usize, seeds: Vec<Cell>) -> Self {
        Self {
            seeds,
            table: DistanceTable::new(dim),
            propagations: 0,
        }
    }

    pub fn seeds(&self) -> &[Cell] {
        &self.seeds
    }

    /// Swap the goal region. The table is kept until the next propagation.
    pub fn set_seeds(&mut self, seeds: Vec<Cell>) {
        self.seeds = seeds;
    }

    pub const fn table(&self) -> &DistanceTable {
        &self.table
    }

    pub const fn propagations(&self) -> usize {
        self.propagations
    }

    pub fn propagate<G: WallGrid>(&mut self, grid: &G) {
        self.table = flood_fill(grid, &self.seeds);
        self.propagations += 1;
    }

    /// Open neighbour with the strictly smallest distance, below the current
    /// cell's own. `Direction::ALL` order breaks ties.
    fn downhill<G: WallGrid>(&self, grid: &G, from: Cell) -> Option<Direction> {
        let mut best = self.table.get(from);
        let mut best_direction = None;
        for (direction, neighbor) in grid.open_neighbors(from) {
            let distance = self.table.get(neighbor);
            if distance < best {
                best = distance;
                best_direction = Some(direction);
            }
        }
        best_direction
    }

    /// Next move towards the seeds. When the table has no downhill neighbour
    /// (walls changed since the last propagation) it is recomputed once.
    /// `None` means the seeds are unreachable from `from`, or `from` is a seed.
    pub fn best_direction<G: WallGrid>(&mut self, grid: &G, from: Cell) -> Option<Direction> {
        if let Some(direction) = self.downhill(grid, from) {
            return Some(direction);
        }
        self.propagate(grid);
        let direction = self.downhill(grid, from);
        if direction.is_none() && self.table.get(from) != 0 {
            log::warn!("flood fill: no route from {from} to {:?}", self.seeds);
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::maze::MazeModel;

    #[test]
    fn test_open_grid_is_manhattan() {
        let grid = MazeModel::new(8, true);
        let goal = Cell::new(4, 4);
        let table = flood_fill(&grid, &[goal]);
        assert_eq!(table.get(Cell::ORIGIN), 8);
        for x in 0..8 {
            for y in 0..8 {
                let cell = Cell::new(x, y);
                assert_eq!(table.get(cell) as usize, cell.manhattan(goal));
            }
        }
    }

    #[test]
    fn test_multi_cell_goal_uses_nearest_seed() {
        let grid = MazeModel::new(8, true);
        let room = grid.goal_room();
        let table = flood_fill(&grid, &room);
        assert_eq!(table.get(Cell::ORIGIN), 6);
        assert_eq!(table.get(Cell::new(7, 7)), 6);
        assert!(room.iter().all(|&cell| table.get(cell) == 0));
    }

    #[test]
    fn test_flood_fill_is_idempotent() {
        let mut grid = MazeModel::new(6, true);
        grid.set_wall(Cell::new(2, 2), Direction::Up, true);
        grid.set_wall(Cell::new(2, 2), Direction::Right, true);
        grid.set_wall(Cell::new(1, 4), Direction::Down, true);
        let first = flood_fill(&grid, &[Cell::ORIGIN]);
        let second = flood_fill(&grid, &[Cell::ORIGIN]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_walls_lengthen_routes() {
        let mut grid = MazeModel::new(3, true);
        // Wall off (0,1) from (0,0); the route goes around through (1,*)
        grid.set_wall(Cell::ORIGIN, Direction::Up, true);
        let table = flood_fill(&grid, &[Cell::ORIGIN]);
        assert_eq!(table.get(Cell::new(0, 1)), 3);
    }

    #[test]
    fn test_unreachable_cells_keep_sentinel() {
        let mut grid = MazeModel::new(3, true);
        grid.set_wall(Cell::new(2, 2), Direction::Down, true);
        grid.set_wall(Cell::new(2, 2), Direction::Left, true);
        let table = flood_fill(&grid, &[Cell::ORIGIN]);
        assert_eq!(table.get(Cell::new(2, 2)), UNREACHED);
        assert_eq!(table.get(Cell::new(9, 9)), UNREACHED);
    }

    #[test]
    fn test_best_direction_propagates_lazily() {
        let grid = MazeModel::new(4, true);
        let mut fill = FloodFill::new(4, vec![Cell::new(3, 0)]);
        assert_eq!(fill.propagations(), 0);

        assert_eq!(fill.best_direction(&grid, Cell::ORIGIN), Some(Direction::Right));
        assert_eq!(fill.propagations(), 1);
        // Table is fresh, no second propagation
        assert_eq!(fill.best_direction(&grid, Cell::new(1, 0)), Some(Direction::Right));
        assert_eq!(fill.propagations(), 1);
    }

    #[test]
    fn test_new_wall_triggers_recompute() {
        let mut grid = MazeModel::new(3, true);
        let mut fill = FloodFill::new(3, vec![Cell::new(2, 0)]);
        assert_eq!(fill.best_direction(&grid, Cell::new(1, 0)), Some(Direction::Right));

        // Block the direct way; the stale table now has no downhill move
        grid.set_wall(Cell::new(1, 0), Direction::Right, true);
        grid.set_wall(Cell::new(1, 0), Direction::Left, true);
        assert_eq!(fill.best_direction(&grid, Cell::new(1, 0)), Some(Direction::Up));
        assert_eq!(fill.propagations(), 2);
    }

    #[test]
    fn test_no_route_gives_none() {
        let mut grid = MazeModel::new(2, true);
        grid.set_wall(Cell::ORIGIN, Direction::Up, true);
        grid.set_wall(Cell::ORIGIN, Direction::Right, true);
        let mut fill = FloodFill::new(2, vec![Cell::new(1, 1)]);
        assert_eq!(fill.best_direction(&grid, Cell::ORIGIN), None);
    }
}
