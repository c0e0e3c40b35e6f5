use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PieceOverflowError;

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Piece, PieceKind},
};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Locked cell, tagged with the kind of the piece that left it.
    Piece(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Piece(kind) => kind.as_char(),
        }
    }
}

type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; BOARD_WIDTH];

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const WIDTH_I32: i32 = BOARD_WIDTH as i32;
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const HEIGHT_I32: i32 = BOARD_HEIGHT as i32;

fn is_row_complete(row: &Row) -> bool {
    row.iter().all(|cell| !cell.is_empty())
}

/// The grid of locked cells.
///
/// Row 0 is the top of the visible board. Only [`Board::lock`] and
/// [`Board::clear_completed_rows`] mutate it during play; the falling piece
/// is never stored here until it locks.
///
/// # Example
///
/// ```
/// use chromatris_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::O).drop_position(&board);
/// board.lock(&piece).unwrap();
/// assert!(board.is_occupied(4, 19));
/// assert_eq!(board.clear_completed_rows(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [EMPTY_ROW; BOARD_HEIGHT],
    };

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < BOARD_WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < BOARD_HEIGHT)?;
        Some((x, y))
    }

    /// Returns the cell at the given coordinates, or `None` off the board.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|(x, y)| self.rows[y][x])
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }

    #[must_use]
    pub fn is_row_complete(&self, y: usize) -> bool {
        self.rows.get(y).is_some_and(is_row_complete)
    }

    /// Checks whether a piece cell may not be placed at `(x, y)`.
    ///
    /// Side walls and the floor count as occupied. Rows above the board
    /// (`y < 0`) are free so pieces can rotate and spawn partially hidden.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= WIDTH_I32 || y >= HEIGHT_I32 {
            return true;
        }
        y >= 0 && self.cell(x, y).is_some_and(|cell| !cell.is_empty())
    }

    /// Checks that every cell of the piece is free.
    #[must_use]
    pub fn can_place(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y)| !self.is_occupied(x, y))
    }

    /// Writes the piece's kind into every cell it covers on the board.
    ///
    /// Cells above the top row cannot be stored; they are skipped and
    /// reported as [`PieceOverflowError`] after the visible cells are
    /// written.
    pub fn lock(&mut self, piece: &Piece) -> Result<(), PieceOverflowError> {
        let mut overflow = false;
        for (x, y) in piece.cells() {
            if y < 0 {
                overflow = true;
                continue;
            }
            if let Some((x, y)) = Self::index(x, y) {
                self.rows[y][x] = Cell::Piece(piece.kind());
            }
        }
        if overflow {
            return Err(PieceOverflowError);
        }
        Ok(())
    }

    /// Removes every complete row at once and returns how many were removed.
    ///
    /// Rows above a removed row fall by the number of removed rows below
    /// them, and the vacated rows at the top become empty.
    pub fn clear_completed_rows(&mut self) -> usize {
        let mut count = 0;
        for y in (0..BOARD_HEIGHT).rev() {
            if is_row_complete(&self.rows[y]) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(EMPTY_ROW);
        count
    }

    /// Creates a `Board` from ASCII art.
    ///
    /// `.` is an empty cell, a piece letter (`IJLOSTZ`, either case) is a
    /// cell of that kind and `#` is a cell of an unspecified kind (stored as
    /// `O`). Rows are listed top to bottom and aligned to the bottom of the
    /// board, so short art describes the lowest rows.
    ///
    /// # Panics
    ///
    /// Panics if a row is not exactly 10 cells wide or there are more than
    /// 20 rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "Board must have at most {BOARD_HEIGHT} rows, got {}",
            lines.len()
        );

        let mut board = Self::EMPTY;
        let top = BOARD_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            board.rows[top + i] =
                parse_row(line).unwrap_or_else(|reason| panic!("row {i}: {reason}"));
        }
        board
    }
}

fn parse_row(line: &str) -> Result<Row, String> {
    let cells: Vec<Cell> = line
        .chars()
        .map(|c| match c {
            '.' => Ok(Cell::Empty),
            '#' => Ok(Cell::Piece(PieceKind::O)),
            c => PieceKind::from_char(c)
                .map(Cell::Piece)
                .ok_or_else(|| format!("invalid cell character {c:?}")),
        })
        .collect::<Result<_, _>>()?;
    let width = cells.len();
    cells
        .try_into()
        .map_err(|_| format!("each row must have exactly {BOARD_WIDTH} cells, got {width}"))
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one string per row, top to bottom (e.g., "....TT....")
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
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
        if lines.len() != BOARD_HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {BOARD_HEIGHT} rows, got {}",
                lines.len()
            )));
        }

        let mut board = Self::EMPTY;
        for (y, line) in lines.iter().enumerate() {
            board.rows[y] = parse_row(line)
                .map_err(|reason| serde::de::Error::custom(format!("row {y}: {reason}")))?;
        }
        Ok(board)
    }
}
