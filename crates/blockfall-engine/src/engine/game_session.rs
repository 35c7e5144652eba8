use std::time::Duration;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    HoldError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, RotationDirection},
    },
};

use super::{GameStats, game_field::GameField, piece_buffer::PieceSeed};

/// Lifecycle of a [`GameSession`].
///
/// `NotStarted -> Running <-> Paused`, `Running -> GameOver`. Only
/// [`GameSession::restart`] leaves `GameOver`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant, Deserialize, Serialize,
)]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// The command surface of a [`GameSession`] as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Command {
    Start,
    Restart,
    TogglePause,
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    SoftDrop,
    HardDrop,
    Hold,
}

impl Command {
    pub const ALL: [Self; 10] = [
        Self::Start,
        Self::Restart,
        Self::TogglePause,
        Self::MoveLeft,
        Self::MoveRight,
        Self::RotateCw,
        Self::RotateCcw,
        Self::SoftDrop,
        Self::HardDrop,
        Self::Hold,
    ];
}

/// A command-driven game: field, statistics, lifecycle and gravity timer.
///
/// Commands issued in a state where they do not apply are silent no-ops; every
/// command method returns whether it changed the session. The only fatal event
/// is a blocked spawn, which ends the game.
///
/// Each game draws its own [`PieceSeed`] from the session generator, so a
/// session created with [`Self::with_seed`] plays the same piece sequences.
#[derive(Debug, Clone)]
pub struct GameSession {
    field: GameField,
    stats: GameStats,
    session_state: SessionState,
    rng: Pcg32,
    game_seed: PieceSeed,
    drop_elapsed: Duration,
    played: Duration,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a session in [`SessionState::NotStarted`] with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.to_bytes());
        let game_seed = rng.random();
        Self {
            field: GameField::with_seed(game_seed),
            stats: GameStats::new(),
            session_state: SessionState::NotStarted,
            rng,
            game_seed,
            drop_elapsed: Duration::ZERO,
            played: Duration::ZERO,
        }
    }

    fn reset(&mut self) {
        self.game_seed = self.rng.random();
        self.field = GameField::with_seed(self.game_seed);
        self.stats = GameStats::new();
        self.session_state = SessionState::Running;
        self.drop_elapsed = Duration::ZERO;
        self.played = Duration::ZERO;
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    /// Returns the falling piece while a game is running or paused.
    #[must_use]
    pub fn falling_piece(&self) -> Option<Piece> {
        self.has_falling_piece().then(|| self.field.falling_piece())
    }

    /// Returns where the falling piece would land if hard-dropped now.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.has_falling_piece()
            .then(|| self.field.simulate_drop_position())
    }

    fn has_falling_piece(&self) -> bool {
        matches!(
            self.session_state,
            SessionState::Running | SessionState::Paused
        )
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.field.held_piece()
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.field.can_hold()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.field.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Returns the seed of the piece sequence of the current game.
    #[must_use]
    pub fn game_seed(&self) -> PieceSeed {
        self.game_seed
    }

    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        self.stats.gravity_interval()
    }

    /// Returns the time advanced while running. Paused time is not counted.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.played
    }

    /// Starts the first game. Only valid before any game has started.
    pub fn start(&mut self) -> bool {
        if !self.session_state.is_not_started() {
            return false;
        }
        self.reset();
        true
    }

    /// Discards the current game, if any, and starts a new one.
    pub fn restart(&mut self) -> bool {
        self.reset();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.session_state = match self.session_state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::NotStarted | SessionState::GameOver => return false,
        };
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.session_state.is_running() && self.field.try_move_left().is_ok()
    }

    pub fn move_right(&mut self) -> bool {
        self.session_state.is_running() && self.field.try_move_right().is_ok()
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.session_state.is_running()
            && self.field.try_rotate(RotationDirection::Clockwise).is_ok()
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.session_state.is_running()
            && self
                .field
                .try_rotate(RotationDirection::CounterClockwise)
                .is_ok()
    }

    /// Moves the piece down one row for one point, or locks it if it is resting.
    pub fn soft_drop(&mut self) -> bool {
        if !self.session_state.is_running() {
            return false;
        }
        if self.field.try_move_down().is_ok() {
            self.stats.soft_drop();
        } else {
            self.complete_piece_drop();
        }
        true
    }

    /// Drops the piece to its resting row for two points per row and locks it.
    pub fn hard_drop(&mut self) -> bool {
        if !self.session_state.is_running() {
            return false;
        }
        let rows = self.field.hard_drop();
        self.stats.hard_drop(rows);
        self.complete_piece_drop();
        true
    }

    pub fn hold(&mut self) -> bool {
        if !self.session_state.is_running() {
            return false;
        }
        match self.field.try_hold() {
            Ok(()) => true,
            Err(HoldError::AlreadyUsed) => false,
            Err(HoldError::SpawnBlocked(_)) => {
                self.session_state = SessionState::GameOver;
                true
            }
        }
    }

    /// Dispatches `command` to the matching method.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Restart => self.restart(),
            Command::TogglePause => self.toggle_pause(),
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::RotateCw => self.rotate_cw(),
            Command::RotateCcw => self.rotate_ccw(),
            Command::SoftDrop => self.soft_drop(),
            Command::HardDrop => self.hard_drop(),
            Command::Hold => self.hold(),
        }
    }

    /// Advances the gravity timer.
    ///
    /// Once the accumulated time exceeds the gravity interval, the piece moves
    /// down one row (or locks if it is resting) and the accumulator restarts
    /// from zero. Does nothing unless the game is running.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.session_state.is_running() {
            return;
        }
        self.played = self.played.saturating_add(elapsed);
        self.drop_elapsed = self.drop_elapsed.saturating_add(elapsed);
        if self.drop_elapsed > self.gravity_interval() {
            self.drop_elapsed = Duration::ZERO;
            self.auto_drop_and_complete();
        }
    }

    fn auto_drop_and_complete(&mut self) {
        if self.field.try_move_down().is_ok() {
            return;
        }
        self.complete_piece_drop();
    }

    fn complete_piece_drop(&mut self) {
        let (cleared_lines, result) = self.field.complete_piece_drop();
        self.stats.complete_piece_drop(cleared_lines);
        if result.is_err() {
            self.session_state = SessionState::GameOver;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};

    use super::*;
    use crate::core::{
        board::Cell,
        piece::{Orientation, PiecePosition},
    };

    const SEED: PieceSeed = PieceSeed::from_bytes([42; 16]);

    fn started() -> GameSession {
        let mut session = GameSession::with_seed(SEED);
        assert!(session.start());
        session
    }

    fn piece_at(kind: PieceKind, orientation: Orientation, x: i32, y: i32) -> Piece {
        Piece::with_placement(kind, orientation, PiecePosition::new(x, y))
    }

    fn fill_row_except(board: &mut Board, y: usize, hole: Option<usize>) {
        for x in 0..Board::WIDTH {
            let cell = if Some(x) == hole {
                Cell::Empty
            } else {
                Cell::Filled(PieceKind::J)
            };
            board.set_cell(x, y, cell);
        }
    }

    #[test]
    fn test_commands_before_start_are_ignored() {
        let mut session = GameSession::with_seed(SEED);
        for command in Command::ALL {
            if matches!(command, Command::Start | Command::Restart) {
                continue;
            }
            assert!(!session.apply(command), "{command:?}");
        }
        session.advance(Duration::from_secs(10));
        assert!(session.session_state().is_not_started());
        assert_eq!(session.falling_piece(), None);
        assert_eq!(session.duration(), Duration::ZERO);
        assert_eq!(session.stats(), &GameStats::new());
    }

    #[test]
    fn test_start_spawns_first_piece() {
        let mut session = started();
        assert!(session.session_state().is_running());
        let piece = session.falling_piece().unwrap();
        assert_eq!(piece.position(), PiecePosition::SPAWN);
        assert_eq!(piece.orientation(), Orientation::Spawn);
        assert_eq!(session.next_pieces().count(), 5);
        assert_eq!(session.held_piece(), None);
        assert!(!session.start());
    }

    #[test]
    fn test_same_seed_same_games() {
        let mut a = started();
        let mut b = started();
        assert_eq!(a.game_seed(), b.game_seed());
        assert!(a.next_pieces().eq(b.next_pieces()));

        a.restart();
        b.restart();
        assert_eq!(a.game_seed(), b.game_seed());
        assert_eq!(a.falling_piece(), b.falling_piece());
    }

    #[test]
    fn test_pause_ignores_commands_and_gravity() {
        let mut session = started();
        session.advance(Duration::from_millis(600));
        assert!(session.toggle_pause());
        assert!(session.session_state().is_paused());

        let piece = session.falling_piece();
        assert!(!session.move_left());
        assert!(!session.rotate_cw());
        assert!(!session.hard_drop());
        assert!(!session.hold());
        session.advance(Duration::from_secs(5));
        assert_eq!(session.falling_piece(), piece);
        assert_eq!(session.duration(), Duration::from_millis(600));

        assert!(session.toggle_pause());
        assert!(session.session_state().is_running());
        // The accumulator survives the pause: 600 + 401 > 1000.
        session.advance(Duration::from_millis(401));
        let moved = session.falling_piece().unwrap();
        assert_eq!(moved.position().y(), PiecePosition::SPAWN.y() + 1);
    }

    #[test]
    fn test_gravity_uses_strict_comparison_and_resets() {
        let mut session = started();
        let spawn_y = PiecePosition::SPAWN.y();

        session.advance(Duration::from_millis(1000));
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y);
        session.advance(Duration::from_millis(1));
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y + 1);

        // One drop per call, and the accumulator starts over.
        session.advance(Duration::from_millis(1000));
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y + 1);
        session.advance(Duration::from_secs(30));
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y + 2);
        assert_eq!(session.duration(), Duration::from_millis(32_001));
    }

    #[test]
    fn test_advance_saturates_on_huge_elapsed() {
        let mut session = started();
        let spawn_y = PiecePosition::SPAWN.y();
        session.advance(Duration::from_millis(1));
        session.advance(Duration::MAX);
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y + 1);
        assert_eq!(session.duration(), Duration::MAX);

        session.advance(Duration::MAX);
        assert_eq!(session.falling_piece().unwrap().position().y(), spawn_y + 2);
        assert_eq!(session.duration(), Duration::MAX);
    }

    #[test]
    fn test_gravity_locks_resting_piece() {
        let mut session = started();
        let piece = piece_at(PieceKind::T, Orientation::Spawn, 4, 20);
        session.field.set_falling_piece(piece).unwrap();

        session.advance(Duration::from_millis(1001));
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.board().cell(4, 21), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(session.stats().score(), 0);
    }

    #[test]
    fn test_soft_drop_awards_point_then_locks() {
        let mut session = started();
        let piece = piece_at(PieceKind::T, Orientation::Spawn, 4, 19);
        session.field.set_falling_piece(piece).unwrap();

        assert!(session.soft_drop());
        assert_eq!(session.stats().score(), 1);
        assert_eq!(session.stats().completed_pieces(), 0);

        assert!(session.soft_drop());
        assert_eq!(session.stats().score(), 1);
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_hard_drop_awards_two_points_per_row() {
        let mut session = started();
        session.field.set_falling_piece(Piece::new(PieceKind::T)).unwrap();

        assert!(session.hard_drop());
        assert_eq!(session.stats().score(), 2 * 19);
        assert_eq!(session.stats().drop_points(), 2 * 19);
        for x in 4..=6 {
            assert_eq!(session.board().cell(x, 20), Some(Cell::Filled(PieceKind::T)));
        }
        assert_eq!(session.board().cell(5, 21), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(session.falling_piece().unwrap().position(), PiecePosition::SPAWN);
    }

    #[test]
    fn test_four_line_clear_scores_800_at_level_one() {
        let mut session = started();
        for y in 18..Board::HEIGHT {
            fill_row_except(session.field.board_mut(), y, Some(0));
        }
        let piece = piece_at(PieceKind::I, Orientation::Left, 0, 1);
        session.field.set_falling_piece(piece).unwrap();

        assert!(session.hard_drop());
        assert_eq!(session.stats().total_cleared_lines(), 4);
        assert_eq!(session.stats().score(), 800 + 2 * 18);
        assert_eq!(session.board(), &Board::INITIAL);
        assert!(session.session_state().is_running());
    }

    #[test]
    fn test_single_at_level_two_scores_200() {
        let mut session = started();
        for _ in 0..10 {
            session.stats.complete_piece_drop(1);
        }
        assert_eq!(session.stats().level(), 2);
        let before = session.stats().score();

        fill_row_except(session.field.board_mut(), 21, Some(0));
        let piece = piece_at(PieceKind::I, Orientation::Left, 0, 19);
        session.field.set_falling_piece(piece).unwrap();
        assert!(session.hard_drop());
        assert_eq!(session.stats().score(), before + 200);
        assert_eq!(session.gravity_interval(), Duration::from_millis(793));
    }

    #[test]
    fn test_hold_into_empty_slot_then_second_hold_is_noop() {
        let mut session = started();
        let first = session.falling_piece().unwrap().kind();
        let next = session.next_pieces().next().unwrap();

        assert!(session.hold());
        assert_eq!(session.held_piece(), Some(first));
        assert_eq!(session.falling_piece(), Some(Piece::new(next)));
        assert!(!session.can_hold());

        let falling = session.falling_piece();
        assert!(!session.hold());
        assert_eq!(session.held_piece(), Some(first));
        assert_eq!(session.falling_piece(), falling);

        // Hold is available again after a lock and swaps with the slot.
        assert!(session.hard_drop());
        assert!(session.can_hold());
        let current = session.falling_piece().unwrap().kind();
        assert!(session.hold());
        assert_eq!(session.held_piece(), Some(current));
        assert_eq!(session.falling_piece(), Some(Piece::new(first)));
    }

    #[test]
    fn test_blocked_spawn_ends_game_without_scoring() {
        let mut session = started();
        fill_row_except(session.field.board_mut(), 0, None);
        fill_row_except(session.field.board_mut(), 1, None);
        let piece = piece_at(PieceKind::O, Orientation::Spawn, 0, 20);
        session.field.set_falling_piece_unchecked(piece);

        assert!(session.hard_drop());
        assert!(session.session_state().is_game_over());
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().total_cleared_lines(), 0);
        assert_eq!(session.falling_piece(), None);
        assert_eq!(session.ghost_piece(), None);

        for command in [Command::Start, Command::TogglePause, Command::HardDrop] {
            assert!(!session.apply(command), "{command:?}");
        }
        assert!(session.restart());
        assert!(session.session_state().is_running());
        assert_eq!(session.board(), &Board::INITIAL);
        assert_eq!(session.stats(), &GameStats::new());
    }

    #[test]
    fn test_hold_into_blocked_spawn_ends_game() {
        let mut session = started();
        fill_row_except(session.field.board_mut(), 1, None);
        assert!(session.hold());
        assert!(session.session_state().is_game_over());
    }

    #[test]
    fn test_rotating_o_piece_is_noop() {
        let mut session = started();
        let piece = Piece::new(PieceKind::O);
        session.field.set_falling_piece(piece).unwrap();
        assert!(!session.rotate_cw());
        assert!(!session.rotate_ccw());
        assert_eq!(session.falling_piece(), Some(piece));
    }

    #[test]
    fn test_ghost_piece_rests_on_floor() {
        let session = started();
        let piece = session.falling_piece().unwrap();
        let ghost = session.ghost_piece().unwrap();
        assert_eq!(ghost.kind(), piece.kind());
        assert_eq!(ghost.orientation(), piece.orientation());
        assert_eq!(ghost.position().x(), piece.position().x());
        assert_eq!(ghost.position().y(), piece.ghost_row(session.board()));
        assert!(ghost.position().y() > piece.position().y());
    }

    #[test]
    fn test_score_and_lines_never_decrease() {
        let commands = [
            Command::MoveLeft,
            Command::MoveRight,
            Command::RotateCw,
            Command::RotateCcw,
            Command::SoftDrop,
            Command::HardDrop,
            Command::Hold,
        ];
        let mut rng = Pcg32::from_seed([3; 16]);
        let mut session = started();
        let mut score = 0;
        let mut lines = 0;
        for _ in 0..5000 {
            let command = commands[rng.random_range(0..commands.len())];
            session.apply(command);
            session.advance(Duration::from_millis(50));
            assert!(session.stats().score() >= score);
            assert!(session.stats().total_cleared_lines() >= lines);
            score = session.stats().score();
            lines = session.stats().total_cleared_lines();
            if session.session_state().is_game_over() {
                break;
            }
        }
        assert!(session.stats().completed_pieces() > 0);
    }
}
