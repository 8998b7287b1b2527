use crate::engine::Game;
use serde::{Deserialize, Serialize};
use std::fmt;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardCoordinate {
    pub row: usize,
    pub col: usize,
}

impl BoardCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,
    Blocked,
    NotAKnightJump,
    GameOver,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::OutOfBounds => "square is off the board",
            Self::Blocked => "square is already blocked",
            Self::NotAKnightJump => "square is not a knight jump away",
            Self::GameOver => "the player to move has no legal moves",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for MoveError {}

/// Isolation: each player moves like a knight and every visited square is
/// burned. A player's first move may land on any open square. Whoever has no
/// move on their turn loses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationBoard {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
    locations: [Option<BoardCoordinate>; 2],
    active: Player,
    move_count: usize,
}

impl IsolationBoard {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
            locations: [None, None],
            active: Player::One,
            move_count: 0,
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn active_player(&self) -> Player {
        self.active
    }

    pub const fn inactive_player(&self) -> Player {
        self.active.opposite()
    }

    pub const fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn location(&self, player: Player) -> Option<BoardCoordinate> {
        self.locations.get(player.index()).copied().flatten()
    }

    #[must_use]
    pub const fn center(&self) -> BoardCoordinate {
        BoardCoordinate::new(self.height / 2, self.width / 2)
    }

    const fn index(&self, coord: BoardCoordinate) -> Option<usize> {
        if coord.row < self.height && coord.col < self.width {
            Some(coord.row * self.width + coord.col)
        } else {
            None
        }
    }

    pub fn is_blank(&self, coord: BoardCoordinate) -> bool {
        self.index(coord)
            .and_then(|idx| self.blocked.get(idx))
            .is_some_and(|blocked| !blocked)
    }

    /// Burn a square without moving anyone. Used to set up positions.
    pub fn block(&mut self, coord: BoardCoordinate) -> Result<(), MoveError> {
        let idx = self.index(coord).ok_or(MoveError::OutOfBounds)?;
        if let Some(cell) = self.blocked.get_mut(idx) {
            *cell = true;
        }
        Ok(())
    }

    fn jump(&self, from: BoardCoordinate, dr: i32, dc: i32) -> Option<BoardCoordinate> {
        let row = i32::try_from(from.row).ok()? + dr;
        let col = i32::try_from(from.col).ok()? + dc;
        let coord = BoardCoordinate::new(usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        self.index(coord).map(|_| coord)
    }

    /// Knight jumps from the player's square that stay on the board, whether
    /// or not the target is still open.
    pub fn valid_knight_moves(&self, player: Player) -> Vec<BoardCoordinate> {
        self.location(player).map_or_else(Vec::new, |from| {
            KNIGHT_OFFSETS
                .iter()
                .filter_map(|&(dr, dc)| self.jump(from, dr, dc))
                .collect()
        })
    }

    pub fn legal_moves(&self, player: Player) -> Vec<BoardCoordinate> {
        match self.location(player) {
            None => (0..self.height)
                .flat_map(|row| (0..self.width).map(move |col| BoardCoordinate::new(row, col)))
                .filter(|&coord| self.is_blank(coord))
                .collect(),
            Some(_) => self
                .valid_knight_moves(player)
                .into_iter()
                .filter(|&coord| self.is_blank(coord))
                .collect(),
        }
    }

    pub fn make_move(&mut self, to: BoardCoordinate) -> Result<(), MoveError> {
        let idx = self.index(to).ok_or(MoveError::OutOfBounds)?;
        if self.blocked.get(idx).copied().unwrap_or(true) {
            return Err(MoveError::Blocked);
        }
        let legal = self.legal_moves(self.active);
        if legal.is_empty() {
            return Err(MoveError::GameOver);
        }
        if !legal.contains(&to) {
            return Err(MoveError::NotAKnightJump);
        }
        self.apply(to);
        Ok(())
    }

    /// The board after the active player moves to `to`. `to` must be legal.
    #[must_use]
    pub fn forecast_move(&self, to: BoardCoordinate) -> Self {
        let mut next = self.clone();
        next.apply(to);
        next
    }

    fn apply(&mut self, to: BoardCoordinate) {
        if let Some(idx) = self.index(to) {
            if let Some(cell) = self.blocked.get_mut(idx) {
                *cell = true;
            }
        }
        if let Some(slot) = self.locations.get_mut(self.active.index()) {
            *slot = Some(to);
        }
        self.active = self.active.opposite();
        self.move_count += 1;
    }

    pub fn is_loser(&self, player: Player) -> bool {
        player == self.active && self.legal_moves(player).is_empty()
    }

    pub fn is_winner(&self, player: Player) -> bool {
        player == self.inactive_player() && self.legal_moves(self.active).is_empty()
    }
}

impl Game for IsolationBoard {
    type Action = BoardCoordinate;
    type Player = Player;

    fn active_player(&self) -> Player {
        self.active
    }

    fn legal_actions(&self) -> Vec<BoardCoordinate> {
        self.legal_moves(self.active)
    }

    fn forecast(&self, action: BoardCoordinate) -> Self {
        self.forecast_move(action)
    }

    fn plies_played(&self) -> usize {
        self.move_count
    }
}
