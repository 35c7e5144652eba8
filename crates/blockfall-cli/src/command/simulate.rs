use std::{path::PathBuf, time::Duration};

use blockfall_engine::{Command, GameSession, PieceSeed};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{model::session::SessionSummary, util::Output};

/// Commands the driver picks from, repeated to weight the draw.
///
/// Hard drops are rare so that gravity and soft drops also get to lock pieces.
const DRIVER_COMMANDS: &[Command] = &[
    Command::MoveLeft,
    Command::MoveLeft,
    Command::MoveRight,
    Command::MoveRight,
    Command::RotateCw,
    Command::RotateCcw,
    Command::SoftDrop,
    Command::SoftDrop,
    Command::SoftDrop,
    Command::HardDrop,
    Command::Hold,
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Stop a game once this many pieces have been locked
    #[arg(long, default_value_t = 500)]
    max_pieces: usize,
    /// Time advanced after every command, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Session seed (32 hex characters); random if omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        games,
        max_pieces,
        frame_ms,
        seed,
        output,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let frame = Duration::from_millis(*frame_ms);
    let mut rng = Pcg32::from_seed(seed.to_bytes());
    let mut session = GameSession::with_seed(seed);

    eprintln!("Simulating {games} games with seed {seed}...");

    let mut summaries = Vec::with_capacity(*games);
    for game in 0..*games {
        if game == 0 {
            session.start();
        } else {
            session.restart();
        }

        let mut commands = 0;
        while session.session_state().is_running()
            && session.stats().completed_pieces() < *max_pieces
        {
            let command = DRIVER_COMMANDS[rng.random_range(0..DRIVER_COMMANDS.len())];
            session.apply(command);
            session.advance(frame);
            commands += 1;
        }

        let summary = SessionSummary::from_session(game, commands, &session);
        eprintln!(
            "Game {game}: {:?}, score {}, level {}, {} lines, {} pieces",
            summary.state,
            summary.score,
            summary.level,
            summary.cleared_lines,
            summary.completed_pieces,
        );
        summaries.push(summary);
    }

    let best = summaries.iter().map(|s| s.score).max().unwrap_or(0);
    let game_overs = summaries.iter().filter(|s| s.state.is_game_over()).count();
    eprintln!("Best score {best}; {game_overs} of {games} games topped out.");

    Output::save_json(&summaries, output.clone())?;

    Ok(())
}
