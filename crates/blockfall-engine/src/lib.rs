//! Falling-block puzzle engine with SRS-style wall kicks and a 7-bag randomizer.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - static piece data, the [`Board`] grid and immutable [`Piece`] placements
//! - [`engine`] - the piece queue, scoring, and the command-driven [`GameSession`]
//!
//! Rendering, input binding and frame timing are left to the caller, which drives a
//! [`GameSession`] through its command methods and [`GameSession::advance`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("spawned piece overlaps the stack")]
pub struct SpawnBlockedError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("hold already used for this piece")]
    AlreadyUsed,
    #[display("piece colliding when swapping in held piece")]
    SpawnBlocked(SpawnBlockedError),
}
