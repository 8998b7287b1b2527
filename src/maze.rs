use search_core::logic::maze::{Cell, Direction, MazeModel, Sensors, WallGrid};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub enum MazeError {
    Io(std::io::Error),
    MissingDimension,
    BadNumber { line: usize, value: String },
    WrongShape { line: usize, expected: usize, found: usize },
    OpenBoundary { cell: Cell, direction: Direction },
    Mismatch { cell: Cell, direction: Direction },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read maze: {err}"),
            Self::MissingDimension => f.write_str("maze file has no dimension line"),
            Self::BadNumber { line, value } => write!(f, "line {line}: `{value}` is not a number"),
            Self::WrongShape {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected {expected} values, found {found}"),
            Self::OpenBoundary { cell, direction } => {
                write!(f, "cell {cell} is open {direction} onto the outer wall")
            }
            Self::Mismatch { cell, direction } => {
                write!(f, "cell {cell} and its neighbour {direction} disagree about their wall")
            }
        }
    }
}

impl std::error::Error for MazeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MazeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// The real maze the tester drives the robot through.
///
/// Text format: the dimension on the first line, then one line per column
/// (`x` from 0) holding the comma-separated open-side masks of its cells from
/// `y = 0` upwards. Bits: 1 up, 2 right, 4 down, 8 left.
#[derive(Debug, Clone)]
pub struct Maze {
    model: MazeModel,
}

impl Maze {
    pub fn load(path: &Path) -> Result<Self, MazeError> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn generated(dim: usize, seed: u64) -> Self {
        Self {
            model: MazeModel::generate(dim, seed),
        }
    }

    pub fn dim(&self) -> usize {
        self.model.dim()
    }

    pub fn is_permissible(&self, cell: Cell, direction: Direction) -> bool {
        !self.model.has_wall(cell, direction)
    }

    /// Open cells between `cell` and the next wall in `direction`.
    pub fn dist_to_wall(&self, cell: Cell, direction: Direction) -> u32 {
        let mut cell = cell;
        let mut distance = 0;
        while self.is_permissible(cell, direction) {
            let Some(next) = self.model.neighbor(cell, direction) else {
                break;
            };
            cell = next;
            distance += 1;
        }
        distance
    }

    pub fn sensors(&self, cell: Cell, heading: Direction) -> Sensors {
        Sensors(
            heading
                .sensor_directions()
                .map(|direction| self.dist_to_wall(cell, direction)),
        )
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        self.model.is_goal_room_cell(cell)
    }

    pub fn step(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        if self.is_permissible(cell, direction) {
            self.model.neighbor(cell, direction)
        } else {
            None
        }
    }
}

fn parse_number<T: FromStr>(line: usize, value: &str) -> Result<T, MazeError> {
    value.trim().parse().map_err(|_| MazeError::BadNumber {
        line,
        value: value.trim().to_string(),
    })
}

fn mask_at(masks: &[Vec<u8>], cell: Cell) -> u8 {
    masks
        .get(cell.x)
        .and_then(|column| column.get(cell.y))
        .copied()
        .unwrap_or(0)
}

fn validate(masks: &[Vec<u8>]) -> Result<(), MazeError> {
    let grid = MazeModel::new(masks.len(), false);
    for (x, column) in masks.iter().enumerate() {
        for (y, &mask) in column.iter().enumerate() {
            let cell = Cell::new(x, y);
            for direction in Direction::ALL {
                let open = mask & direction.bit() != 0;
                match grid.neighbor(cell, direction) {
                    None if open => return Err(MazeError::OpenBoundary { cell, direction }),
                    None => {}
                    Some(neighbor) => {
                        let back = mask_at(masks, neighbor) & direction.reverse().bit() != 0;
                        if open != back {
                            return Err(MazeError::Mismatch { cell, direction });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

impl FromStr for Maze {
    type Err = MazeError;

    fn from_str(text: &str) -> Result<Self, MazeError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line, first) = lines.next().ok_or(MazeError::MissingDimension)?;
        let dim: usize = parse_number(line, first)?;

        let mut masks = Vec::with_capacity(dim);
        for (line, text) in lines.by_ref().take(dim) {
            let column = text
                .split(',')
                .map(|value| parse_number::<u8>(line, value))
                .collect::<Result<Vec<_>, _>>()?;
            if column.len() != dim {
                return Err(MazeError::WrongShape {
                    line,
                    expected: dim,
                    found: column.len(),
                });
            }
            masks.push(column);
        }
        if masks.len() != dim {
            return Err(MazeError::WrongShape {
                line: line + masks.len() + 1,
                expected: dim,
                found: masks.len(),
            });
        }

        validate(&masks)?;
        Ok(Self {
            model: MazeModel::from_masks(&masks),
        })
    }
}
