use serde::{Deserialize, Serialize};

use super::piece::{Piece, PieceKind};

const WIDTH: usize = 10;
const VISIBLE_HEIGHT: usize = 20;
const HIDDEN_ROWS: usize = 2;
const HEIGHT: usize = VISIBLE_HEIGHT + HIDDEN_ROWS;

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell left behind by a locked piece of the given kind.
    Filled(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Filled(kind) => Some(kind),
        }
    }

    /// `'.'` for an empty cell, the piece letter otherwise.
    #[must_use]
    pub fn as_char(self) -> char {
        self.kind().map_or('.', PieceKind::as_char)
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        PieceKind::from_char(c).map(Cell::Filled)
    }
}

/// A single row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    cells: [Cell; WIDTH],
}

impl BoardRow {
    const EMPTY: Self = BoardRow {
        cells: [Cell::Empty; WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Cell; WIDTH] {
        &self.cells
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }
}

/// The playfield grid.
///
/// The grid is [`Board::WIDTH`] columns by [`Board::HEIGHT`] rows. The top
/// [`Board::HIDDEN_ROWS`] rows form a spawn buffer above the visible area; row 0 is the
/// topmost hidden row and row `HEIGHT - 1` is the bottom of the well.
///
/// Anything outside the grid counts as occupied, so collision checks need no
/// separate wall test.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Cell, Piece, PieceKind};
///
/// let mut board = Board::INITIAL;
/// let piece = Piece::new(PieceKind::O);
/// let landed = piece.simulate_drop_position(&board);
/// board.fill_piece(&landed);
///
/// assert_eq!(board.cell(5, 21), Some(Cell::Filled(PieceKind::O)));
/// assert_eq!(board.clear_lines(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // One string per row, top to bottom: "....II...."
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.as_char()).collect())
            .collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let lines = Vec::<String>::deserialize(deserializer)?;
        if lines.len() != HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {HEIGHT} rows, got {}",
                lines.len()
            )));
        }

        let mut board = Self::INITIAL;
        for (y, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != WIDTH {
                return Err(serde::de::Error::custom(format!(
                    "row {y} must have {WIDTH} cells, got {width}"
                )));
            }
            for (x, c) in line.chars().enumerate() {
                board.rows[y].cells[x] = Cell::from_char(c).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid cell '{c}' at ({x}, {y})"))
                })?;
            }
        }
        Ok(board)
    }
}

impl Board {
    pub const WIDTH: usize = WIDTH;
    pub const VISIBLE_HEIGHT: usize = VISIBLE_HEIGHT;
    pub const HIDDEN_ROWS: usize = HIDDEN_ROWS;
    pub const HEIGHT: usize = HEIGHT;

    pub const INITIAL: Self = Self {
        rows: [BoardRow::EMPTY; HEIGHT],
    };

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < HEIGHT)?;
        Some((x, y))
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = Self::index(x, y)?;
        Some(self.rows[y].cells[x])
    }

    /// Overwrites a single cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y].cells[x] = cell;
    }

    /// Returns whether `(x, y)` is filled. Coordinates outside the grid count as occupied.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_none_or(|c| !c.is_empty())
    }

    /// Checks if the piece collides with the walls, the floor or filled cells.
    ///
    /// Cells above the top of the grid are only checked against the side walls.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            if y < 0 {
                return !usize::try_from(x).is_ok_and(|x| x < WIDTH);
            }
            self.is_occupied(x, y)
        })
    }

    /// Locks a piece onto the board by filling its cells with the piece's kind.
    ///
    /// Cells outside the grid are skipped.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for (x, y) in piece.occupied_positions() {
            if let Some((x, y)) = Self::index(x, y) {
                self.rows[y].cells[x] = Cell::Filled(piece.kind());
            }
        }
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Only visible rows are checked. Rows above a cleared line shift down, hidden rows
    /// included, and empty rows are inserted at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..HEIGHT).rev() {
            if y >= HIDDEN_ROWS && self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    /// Returns an iterator over all rows, hidden rows first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; WIDTH]> {
        self.rows.iter().map(BoardRow::cells)
    }

    /// Returns an iterator over the visible rows (excludes the hidden spawn buffer).
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell; WIDTH]> {
        self.rows[HIDDEN_ROWS..].iter().map(BoardRow::cells)
    }

    /// Creates a `Board` from ASCII art for testing.
    ///
    /// `'.'` is an empty cell and a piece letter (`IOTJLSZ`) is a cell filled by that
    /// kind; other characters are ignored. Rows are aligned to the bottom of the grid,
    /// so the last line of `art` is the bottom row.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have exactly [`Board::WIDTH`] cells or if there are
    /// more than [`Board::HEIGHT`] rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::INITIAL;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= HEIGHT,
            "At most {HEIGHT} rows are allowed, got {}",
            lines.len()
        );

        let top = HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<Cell> = line.chars().filter_map(Cell::from_char).collect();
            assert_eq!(
                cells.len(),
                WIDTH,
                "Each row must have exactly {WIDTH} cells, got {} at row {i}",
                cells.len(),
            );
            board.rows[top + i].cells.copy_from_slice(&cells);
        }
        board
    }
}
