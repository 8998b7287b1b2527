use crate::engine::{Evaluator, LOSS, WIN};
use crate::logic::isolation::{BoardCoordinate, IsolationBoard, Player};
use serde::{Deserialize, Serialize};

/// Position scores for Isolation, all from the point of view of `perspective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    Null,
    OpenMoves,
    Improved,
    #[default]
    CenterBias,
    BoxedRatio,
    BoxedImproved,
    RunAway,
}

const CENTER_BONUS: f64 = 1.5;
const NEAR_CENTER_BONUS: f64 = 0.5;

#[allow(clippy::cast_precision_loss)]
fn count(moves: &[BoardCoordinate]) -> f64 {
    moves.len() as f64
}

// Open squares over on-board knight jumps. A player that has not been placed
// yet is treated as fully open.
fn boxed_ratio(board: &IsolationBoard, player: Player) -> f64 {
    let valid = board.valid_knight_moves(player);
    if valid.is_empty() {
        return if board.location(player).is_none() { 1.0 } else { 0.0 };
    }
    count(&board.legal_moves(player)) / count(&valid)
}

fn improved(board: &IsolationBoard, player: Player) -> f64 {
    count(&board.legal_moves(player)) - count(&board.legal_moves(player.opposite()))
}

fn center_bonus(board: &IsolationBoard, player: Player) -> f64 {
    let Some(location) = board.location(player) else {
        return 0.0;
    };
    let center = board.center();
    if location == center {
        return CENTER_BONUS;
    }
    let dr = location.row.abs_diff(center.row);
    let dc = location.col.abs_diff(center.col);
    if (dr == 1 && dc == 2) || (dr == 2 && dc == 1) {
        NEAR_CENTER_BONUS
    } else {
        0.0
    }
}

impl Heuristic {
    pub fn score(self, board: &IsolationBoard, perspective: Player) -> f64 {
        if board.is_loser(perspective) {
            return LOSS;
        }
        if board.is_winner(perspective) {
            return WIN;
        }

        match self {
            Self::Null => 0.0,
            Self::OpenMoves => count(&board.legal_moves(perspective)),
            Self::Improved => improved(board, perspective),
            Self::CenterBias => improved(board, perspective) + center_bonus(board, perspective),
            Self::BoxedRatio => boxed_ratio(board, perspective),
            Self::BoxedImproved => {
                boxed_ratio(board, perspective) - boxed_ratio(board, perspective.opposite())
            }
            #[allow(clippy::cast_precision_loss)]
            Self::RunAway => match (
                board.location(perspective),
                board.location(perspective.opposite()),
            ) {
                (Some(own), Some(other)) => own.manhattan(other) as f64,
                _ => 0.0,
            },
        }
    }
}

impl Evaluator<IsolationBoard> for Heuristic {
    fn evaluate(&self, game: &IsolationBoard, perspective: Player) -> f64 {
        self.score(game, perspective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(moves: &[(usize, usize)]) -> IsolationBoard {
        let mut board = IsolationBoard::new(7, 7);
        for &(row, col) in moves {
            board.make_move(BoardCoordinate::new(row, col)).unwrap();
        }
        board
    }

    #[test]
    fn test_decided_positions_use_sentinels() {
        let mut board = IsolationBoard::new(3, 3);
        board.make_move(BoardCoordinate::new(0, 0)).unwrap();
        board.make_move(BoardCoordinate::new(1, 1)).unwrap();
        board.make_move(BoardCoordinate::new(1, 2)).unwrap();

        for heuristic in [Heuristic::Null, Heuristic::CenterBias, Heuristic::RunAway] {
            assert_eq!(heuristic.score(&board, Player::Two), LOSS);
            assert_eq!(heuristic.score(&board, Player::One), WIN);
        }
    }

    #[test]
    fn test_improved_is_zero_sum() {
        let board = played(&[(3, 3), (0, 0)]);
        let one = Heuristic::Improved.score(&board, Player::One);
        let two = Heuristic::Improved.score(&board, Player::Two);
        assert!((one - 6.0).abs() < f64::EPSILON); // 8 vs 2
        assert!((one + two).abs() < f64::EPSILON);
    }

    #[test]
    fn test_center_bias_rewards_center() {
        let board = played(&[(3, 3), (0, 0)]);
        let improved = Heuristic::Improved.score(&board, Player::One);
        let biased = Heuristic::CenterBias.score(&board, Player::One);
        assert!((biased - improved - CENTER_BONUS).abs() < f64::EPSILON);

        let near = played(&[(1, 2), (6, 6)]);
        let improved = Heuristic::Improved.score(&near, Player::One);
        let biased = Heuristic::CenterBias.score(&near, Player::One);
        assert!((biased - improved - NEAR_CENTER_BONUS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boxed_ratio() {
        let mut board = played(&[(3, 3), (0, 0)]);
        assert!((Heuristic::BoxedRatio.score(&board, Player::One) - 1.0).abs() < f64::EPSILON);

        board.block(BoardCoordinate::new(1, 4)).unwrap();
        board.block(BoardCoordinate::new(5, 4)).unwrap();
        assert!((Heuristic::BoxedRatio.score(&board, Player::One) - 0.75).abs() < f64::EPSILON);
        // Player two sits in the corner with both jumps open
        assert!(
            (Heuristic::BoxedImproved.score(&board, Player::One) - (0.75 - 1.0)).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_run_away_is_manhattan() {
        let board = played(&[(3, 3), (0, 0)]);
        assert!((Heuristic::RunAway.score(&board, Player::One) - 6.0).abs() < f64::EPSILON);
        let fresh = IsolationBoard::new(7, 7);
        assert!(Heuristic::RunAway.score(&fresh, Player::One).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heuristic_serde_names() {
        let parsed: Heuristic = serde_json::from_str("\"boxed_improved\"").unwrap();
        assert_eq!(parsed, Heuristic::BoxedImproved);
        assert_eq!(Heuristic::default(), Heuristic::CenterBias);
    }
}
