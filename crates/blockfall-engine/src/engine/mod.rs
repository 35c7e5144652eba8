//! Game rules and session state on top of the [`core`](crate::core) data structures.
//!
//! - [`GameField`] - single-turn state (board, falling piece, next pieces, hold slot)
//! - [`GameSession`] - lifecycle state machine with the command and tick surfaces
//! - [`GameStats`] - score, cleared lines, level and gravity speed
//! - [`PieceBuffer`] - 7-bag piece generation with a lookahead queue
//! - [`PieceSeed`] - seed for the piece generator
//!
//! # Game Flow
//!
//! 1. [`GameSession::start`] resets the field and spawns the first piece
//! 2. Commands move, rotate, drop or hold the falling piece
//! 3. [`GameSession::advance`] applies gravity as time passes
//! 4. A locked piece is merged, full lines are cleared and the next piece spawns
//! 5. The game ends when a new piece cannot spawn
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{Command, GameSession};
//!
//! let mut session = GameSession::new();
//! assert!(session.session_state().is_not_started());
//!
//! session.start();
//! session.apply(Command::MoveLeft);
//! session.apply(Command::RotateCw);
//! session.advance(Duration::from_millis(16));
//! session.apply(Command::HardDrop);
//!
//! assert_eq!(session.stats().completed_pieces(), 1);
//! ```

pub use self::{game_field::*, game_session::*, game_stats::*, piece_buffer::*};

mod game_field;
mod game_session;
mod game_stats;
mod piece_buffer;
