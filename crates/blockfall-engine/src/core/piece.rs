use serde::{Deserialize, Serialize};

use super::board::Board;

/// A piece placement: kind, orientation and anchor position.
///
/// Pieces are plain values. Movement and rotation return new `Piece` instances,
/// so a trial placement can be checked against the [`Board`] and committed only
/// when it fits.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left cell of the grid, hidden rows included
/// - X increases rightward, Y increases downward
/// - Occupied cells are the anchor plus the kind's offsets for the current orientation
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Orientation, Piece, PieceKind, RotationDirection};
///
/// let board = Board::INITIAL;
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.left();
/// assert!(!board.is_colliding(&moved));
///
/// let rotated = moved
///     .super_rotated(RotationDirection::Clockwise, &board)
///     .unwrap();
/// assert_eq!(rotated.orientation(), Orientation::Right);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Piece {
    kind: PieceKind,
    orientation: Orientation,
    position: PiecePosition,
}

impl Piece {
    /// Creates a piece of the given kind at the spawn position in spawn orientation.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::with_placement(kind, Orientation::Spawn, PiecePosition::SPAWN)
    }

    #[must_use]
    pub const fn with_placement(
        kind: PieceKind,
        orientation: Orientation,
        position: PiecePosition,
    ) -> Self {
        Self {
            kind,
            orientation,
            position,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        self.kind.color()
    }

    /// Returns the absolute grid coordinates of the four cells of this piece.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind
            .cell_offsets(self.orientation)
            .iter()
            .map(move |&(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.shifted(dx, dy),
            ..*self
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    /// Rotates in place around the anchor without trying any kick.
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            orientation: self.orientation.rotated(direction),
            ..*self
        }
    }

    /// Rotates with wall kicks.
    ///
    /// The kick candidates for the `(from, to)` transition are tried in table order,
    /// and the first placement that does not collide with `board` is returned.
    /// Returns `None` if every candidate collides, or for the O-piece, which never rotates.
    #[must_use]
    pub fn super_rotated(&self, direction: RotationDirection, board: &Board) -> Option<Self> {
        if self.kind == PieceKind::O {
            return None;
        }
        let to = self.orientation.rotated(direction);
        let rotated = Self {
            orientation: to,
            ..*self
        };
        self.kind
            .kicks(self.orientation, to)
            .iter()
            .map(|&(dx, dy)| rotated.shifted(dx, dy))
            .find(|candidate| !board.is_colliding(candidate))
    }

    /// Returns the placement this piece would land at if dropped straight down.
    ///
    /// The search is bounded by the board height.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if board.is_colliding(&next) {
                return dropped;
            }
            dropped = next;
        }
    }

    /// Returns the anchor row of [`Self::simulate_drop_position`].
    #[must_use]
    pub fn ghost_row(&self, board: &Board) -> i32 {
        self.simulate_drop_position(board).position.y
    }
}

/// Anchor position of a piece on the grid.
///
/// Coordinates are signed so that trial placements left of the wall or above the
/// grid can be represented and rejected by [`Board::is_colliding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    /// Horizontal center of the board, on the last hidden row.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const SPAWN: Self = Self::new(
        (Board::WIDTH / 2) as i32,
        (Board::HIDDEN_ROWS - 1) as i32,
    );

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Direction of a single rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Rotation state of a piece.
///
/// The four states form the cycle `0 -> R -> 2 -> L -> 0`, and a rotation always
/// moves to an adjacent state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Orientation {
    /// Spawn state ("0").
    #[default]
    #[serde(rename = "0")]
    Spawn,
    /// One clockwise step from spawn ("R").
    #[serde(rename = "R")]
    Right,
    /// Two steps from spawn ("2").
    #[serde(rename = "2")]
    Reverse,
    /// One counter-clockwise step from spawn ("L").
    #[serde(rename = "L")]
    Left,
}

impl Orientation {
    pub const ALL: [Self; 4] = [Self::Spawn, Self::Right, Self::Reverse, Self::Left];

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        let step = match direction {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => 3,
        };
        Self::ALL[(self.as_usize() + step) % 4]
    }

    const fn as_usize(self) -> usize {
        self as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// J-piece.
    J = 3,
    /// L-piece.
    L = 4,
    /// S-piece.
    S = 5,
    /// Z-piece.
    Z = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::T,
        Self::J,
        Self::L,
        Self::S,
        Self::Z,
    ];

    /// Returns the cell offsets of this kind in the given orientation, relative to the anchor.
    #[must_use]
    pub fn cell_offsets(self, orientation: Orientation) -> &'static CellOffsets {
        &PIECE_SHAPES[self as usize][orientation.as_usize()]
    }

    /// Returns the ordered kick candidates for rotating from `from` to `to`.
    ///
    /// Transitions without a table entry (the O-piece, `0 <-> 2`, `R <-> L` and
    /// same-orientation) yield a single zero offset.
    #[must_use]
    pub fn kicks(self, from: Orientation, to: Orientation) -> &'static [(i32, i32)] {
        let table = match self {
            Self::I => &I_KICKS,
            Self::O => &O_KICKS,
            Self::T | Self::J | Self::L | Self::S | Self::Z => &JLSTZ_KICKS,
        };
        table[from.as_usize()][to.as_usize()]
    }

    /// Display color as a `#rrggbb` hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::I => "#00ffff",
            Self::O => "#ffff00",
            Self::T => "#aa00ff",
            Self::J => "#0000ff",
            Self::L => "#ff7f00",
            Self::S => "#00ff00",
            Self::Z => "#ff0000",
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::T => 'T',
            Self::J => 'J',
            Self::L => 'L',
            Self::S => 'S',
            Self::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('Z'), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'O' => Some(Self::O),
            'T' => Some(Self::T),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            'S' => Some(Self::S),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// Offsets `(dx, dy)` of the four cells of a piece from its anchor.
pub type CellOffsets = [(i32, i32); 4];

/// Cell offsets indexed by `[kind][orientation]`.
static PIECE_SHAPES: [[CellOffsets; 4]; PieceKind::LEN] = [
    // I-piece
    [
        [(-1, 0), (0, 0), (1, 0), (2, 0)],
        [(1, -1), (1, 0), (1, 1), (1, 2)],
        [(-1, 1), (0, 1), (1, 1), (2, 1)],
        [(0, -1), (0, 0), (0, 1), (0, 2)],
    ],
    // O-piece
    [
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
    ],
    // T-piece
    [
        [(-1, 0), (0, 0), (1, 0), (0, 1)],
        [(0, -1), (0, 0), (1, 0), (0, 1)],
        [(-1, 0), (0, 0), (1, 0), (0, -1)],
        [(0, -1), (-1, 0), (0, 0), (0, 1)],
    ],
    // J-piece
    [
        [(-1, 0), (0, 0), (1, 0), (-1, 1)],
        [(0, -1), (0, 0), (0, 1), (1, 1)],
        [(1, -1), (-1, 0), (0, 0), (1, 0)],
        [(0, -1), (0, 0), (0, 1), (-1, -1)],
    ],
    // L-piece
    [
        [(-1, 0), (0, 0), (1, 0), (1, 1)],
        [(0, -1), (0, 0), (0, 1), (-1, 1)],
        [(-1, -1), (-1, 0), (0, 0), (1, 0)],
        [(0, -1), (0, 0), (0, 1), (1, -1)],
    ],
    // S-piece
    [
        [(0, 0), (1, 0), (-1, 1), (0, 1)],
        [(0, -1), (0, 0), (1, 0), (1, 1)],
        [(0, -1), (1, -1), (-1, 0), (0, 0)],
        [(-1, -1), (-1, 0), (0, 0), (0, 1)],
    ],
    // Z-piece
    [
        [(-1, 0), (0, 0), (0, 1), (1, 1)],
        [(1, -1), (0, 0), (1, 0), (0, 1)],
        [(-1, -1), (0, -1), (0, 0), (1, 0)],
        [(0, -1), (-1, 0), (0, 0), (-1, 1)],
    ],
];

/// Kick candidates indexed by `[from][to]`.
type KickTable = [[&'static [(i32, i32)]; 4]; 4];

const NO_KICK: [(i32, i32); 1] = [(0, 0)];

const JLSTZ_0R: [(i32, i32); 5] = [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_R0: [(i32, i32); 5] = [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];
const JLSTZ_2L: [(i32, i32); 5] = [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_L2: [(i32, i32); 5] = [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];

// Each JLSTZ list is shared by two transitions: 0->R / 2->R, R->0 / R->2,
// 2->L / 0->L and L->2 / L->0.
const JLSTZ_KICKS: KickTable = [
    [&NO_KICK, &JLSTZ_0R, &NO_KICK, &JLSTZ_2L],
    [&JLSTZ_R0, &NO_KICK, &JLSTZ_R0, &NO_KICK],
    [&NO_KICK, &JLSTZ_0R, &NO_KICK, &JLSTZ_2L],
    [&JLSTZ_L2, &NO_KICK, &JLSTZ_L2, &NO_KICK],
];

const I_0R: [(i32, i32); 5] = [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)];
const I_R0: [(i32, i32); 5] = [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)];
const I_R2: [(i32, i32); 5] = [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)];
const I_2R: [(i32, i32); 5] = [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)];

// 2->L reuses R->0, L->2 reuses 0->R, L->0 reuses 2->R and 0->L reuses R->2.
const I_KICKS: KickTable = [
    [&NO_KICK, &I_0R, &NO_KICK, &I_R2],
    [&I_R0, &NO_KICK, &I_R2, &NO_KICK],
    [&NO_KICK, &I_2R, &NO_KICK, &I_R0],
    [&I_2R, &NO_KICK, &I_0R, &NO_KICK],
];

const O_KICKS: KickTable = [[&NO_KICK; 4]; 4];
