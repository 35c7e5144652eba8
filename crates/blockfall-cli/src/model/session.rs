use blockfall_engine::{Board, GameSession, PieceSeed, SessionState};
use serde::{Deserialize, Serialize};

/// Final state of one simulated game.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSummary {
    pub game: usize,
    pub seed: PieceSeed,
    pub state: SessionState,
    pub score: usize,
    pub drop_points: usize,
    pub level: usize,
    pub cleared_lines: usize,
    pub line_cleared_counter: [usize; 5],
    pub completed_pieces: usize,
    pub commands: usize,
    pub duration_secs: f64,
    pub board: Board,
}

impl SessionSummary {
    pub fn from_session(game: usize, commands: usize, session: &GameSession) -> Self {
        let stats = session.stats();
        Self {
            game,
            seed: session.game_seed(),
            state: session.session_state(),
            score: stats.score(),
            drop_points: stats.drop_points(),
            level: stats.level(),
            cleared_lines: stats.total_cleared_lines(),
            line_cleared_counter: *stats.line_cleared_counter(),
            completed_pieces: stats.completed_pieces(),
            commands,
            duration_secs: session.duration().as_secs_f64(),
            board: session.board().clone(),
        }
    }
}
