mod duel;
mod maze;
mod settings;
mod tester;

use maze::Maze;
use search_core::robot::Robot;
use settings::Settings;
use std::path::Path;
use std::process::ExitCode;
use tester::Tester;
use tracing_subscriber::EnvFilter;

// navigator [maze-file] [config.json]
fn main() -> ExitCode {
    // initialize tracing; library `log` records are forwarded as well
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "navigator failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let maze_path = args.next();
    let settings = match args.next() {
        Some(path) => Settings::load_from_json(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };

    let maze = match &maze_path {
        Some(path) => Maze::load(Path::new(path))?,
        None => {
            tracing::info!(
                dim = settings.maze_dim,
                seed = settings.navigator.seed,
                "no maze file given, generating one"
            );
            Maze::generated(settings.maze_dim, settings.navigator.seed)
        }
    };

    let mut robot = Robot::new(maze.dim(), &settings.navigator);
    tracing::info!(dim = maze.dim(), strategy = robot.title(), "starting trial");
    let report = Tester::new(&maze)
        .with_max_time(settings.max_time)
        .run(&mut robot)?;

    let session = robot.session();
    match report.score() {
        Some(score) => tracing::info!(
            first_run = report.runtimes.first().copied(),
            second_run = report.runtimes.get(1).copied(),
            explored_pct = session.percent_explored(),
            best_path = session.path_best().len(),
            score = %format!("{score:.3}"),
            "task complete"
        ),
        None => tracing::warn!(
            total_time = report.total_time,
            refused_resets = report.refused_resets,
            explored_pct = session.percent_explored(),
            "task not completed"
        ),
    }

    if settings.duel.enabled {
        let result = duel::play_match(&settings.duel)?;
        tracing::info!(
            winner = ?result.winner,
            plies = result.moves.len(),
            "isolation match over"
        );
    }
    Ok(())
}
