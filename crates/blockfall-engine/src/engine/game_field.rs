use crate::{
    HoldError, PieceCollisionError, SpawnBlockedError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, RotationDirection},
    },
};

use super::piece_buffer::{PieceBuffer, PieceSeed};

/// Single-turn game state: the board, the falling piece, the piece queue and the hold slot.
///
/// Movement and rotation either commit a non-colliding placement or leave the
/// field untouched and report the collision. Locking is explicit through
/// [`Self::complete_piece_drop`].
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: Piece,
    piece_buffer: PieceBuffer,
    held_piece: Option<PieceKind>,
    can_hold: bool,
}

impl GameField {
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut piece_buffer = PieceBuffer::with_seed(seed);
        // The first piece always fits on an empty board.
        let falling_piece = Piece::new(piece_buffer.pop_next());
        Self {
            board: Board::INITIAL,
            falling_piece,
            piece_buffer,
            held_piece: None,
            can_hold: true,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub(crate) fn set_falling_piece_unchecked(&mut self, piece: Piece) {
        self.falling_piece = piece;
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held_piece
    }

    /// Returns `false` once hold has been used for the current piece.
    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    /// Returns where the falling piece would land if hard-dropped now.
    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.falling_piece.simulate_drop_position(&self.board)
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.left())
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.right())
    }

    pub fn try_move_down(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.down())
    }

    /// Rotates the falling piece with wall kicks.
    ///
    /// Fails for the O-piece and when every kick candidate collides.
    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), PieceCollisionError> {
        let piece = self
            .falling_piece
            .super_rotated(direction, &self.board)
            .ok_or(PieceCollisionError)?;
        self.set_falling_piece_unchecked(piece);
        Ok(())
    }

    /// Moves the falling piece down until it rests and returns the number of rows it descended.
    ///
    /// The piece is not locked.
    pub fn hard_drop(&mut self) -> usize {
        let dropped = self.simulate_drop_position();
        let rows = dropped.position().y() - self.falling_piece.position().y();
        self.set_falling_piece_unchecked(dropped);
        rows.unsigned_abs() as usize
    }

    /// Stores the falling piece in the hold slot.
    ///
    /// With an empty slot the next piece is taken from the queue; otherwise the
    /// held kind spawns fresh. Hold is then disabled until the next lock.
    ///
    /// # Errors
    ///
    /// - [`HoldError::AlreadyUsed`] if hold was already used for this piece; the field is unchanged
    /// - [`HoldError::SpawnBlocked`] if the swapped-in piece overlaps the stack; the swap is kept
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if !self.can_hold {
            return Err(HoldError::AlreadyUsed);
        }

        let next_kind = match self.held_piece.take() {
            Some(kind) => kind,
            None => self.piece_buffer.pop_next(),
        };
        self.held_piece = Some(self.falling_piece.kind());
        self.can_hold = false;
        self.spawn(next_kind).map_err(HoldError::SpawnBlocked)
    }

    /// Locks the falling piece, clears full lines and spawns the next piece.
    ///
    /// Returns the number of cleared lines together with the spawn result. Hold is
    /// enabled again after every lock.
    pub fn complete_piece_drop(&mut self) -> (usize, Result<(), SpawnBlockedError>) {
        self.board.fill_piece(&self.falling_piece);
        let cleared_lines = self.board.clear_lines();

        self.can_hold = true;
        let next_kind = self.piece_buffer.pop_next();
        (cleared_lines, self.spawn(next_kind))
    }

    fn spawn(&mut self, kind: PieceKind) -> Result<(), SpawnBlockedError> {
        self.falling_piece = Piece::new(kind);
        if self.board.is_colliding(&self.falling_piece) {
            return Err(SpawnBlockedError);
        }
        Ok(())
    }
}
