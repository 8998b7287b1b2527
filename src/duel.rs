use crate::settings::DuelSettings;
use search_core::engine::clock::Deadline;
use search_core::engine::search::AlphaBetaEngine;
use search_core::engine::Searcher;
use search_core::logic::isolation::{BoardCoordinate, IsolationBoard, MoveError, Player};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MatchReport {
    pub winner: Player,
    pub moves: Vec<BoardCoordinate>,
}

/// Plays one game of Isolation between the two configured engines. Each move
/// gets `move_time_ms` on a fresh clock.
pub fn play_match(settings: &DuelSettings) -> Result<MatchReport, MoveError> {
    let engines = [&settings.player_one, &settings.player_two];
    let mut searchers = engines.map(|config| {
        AlphaBetaEngine::new(Arc::new(config.clone()), config.heuristic)
    });
    let mut board = IsolationBoard::new(settings.width, settings.height);
    let mut moves = Vec::new();

    loop {
        let player = board.active_player();
        let (Some(searcher), Some(config)) = (
            searchers.get_mut(player.index()),
            engines.get(player.index()),
        ) else {
            break;
        };
        let clock = Deadline::after_millis(settings.move_time_ms);
        let Some((to, stats)) = searcher.search(&board, config.search_limit(), &clock) else {
            break;
        };
        board.make_move(to)?;
        moves.push(to);
        tracing::info!(
            ply = board.move_count(),
            player = ?player,
            row = to.row,
            col = to.col,
            depth = stats.depth,
            nodes = stats.nodes,
            score = stats.score,
            "isolation move"
        );
    }

    Ok(MatchReport {
        winner: board.inactive_player(),
        moves,
    })
}
