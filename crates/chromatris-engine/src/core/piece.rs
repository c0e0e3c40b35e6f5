use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{BOARD_WIDTH, board::Board};

/// Positional offsets tried, in order, when rotating a piece.
///
/// This is a simplified kick list, not the official SRS kick data: every
/// piece kind and every rotation transition uses the same six candidates.
/// The first offset at which the rotated piece fits wins.
pub const ROTATION_KICKS: [(i32, i32); 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-2, 0), (2, 0)];

/// A tetromino with position, rotation, and type.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s,
/// and the caller decides whether to commit them.
///
/// # Coordinate System
///
/// - The position is the top-left corner of the piece's 4×4 window
/// - X increases rightward (columns), Y increases downward (rows)
/// - Y may be negative while the piece hangs above the visible board
///
/// # Example
///
/// ```
/// use chromatris_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T);
/// assert_eq!((piece.position().x(), piece.position().y()), (3, 0));
///
/// let moved = piece.moved(1, 0).rotated_right();
/// assert_eq!(moved.position().x(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    /// Creates a piece in its spawn state: rotation 0, horizontally
    /// centered, top row.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn spawn(kind: PieceKind) -> Self {
        let x = ((BOARD_WIDTH - kind.size()) / 2) as i32;
        Self::new(kind, PieceRotation::SPAWN, PiecePosition::new(x, 0))
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Board coordinates of the four occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let PiecePosition { x, y } = self.position;
        self.kind
            .cells(self.rotation)
            .map(move |(dx, dy)| (x + i32::from(dx), y + i32::from(dy)))
    }

    #[must_use]
    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.offset(dx, dy),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Rotates clockwise, trying each of [`ROTATION_KICKS`] in order.
    ///
    /// Returns `None` when no offset yields a legal placement.
    #[must_use]
    pub fn kicked_rotation(&self, board: &Board) -> Option<Self> {
        let rotated = self.rotated_right();
        ROTATION_KICKS
            .iter()
            .map(|&(dx, dy)| rotated.moved(dx, dy))
            .find(|piece| board.can_place(piece))
    }

    /// Returns the piece moved straight down as far as it can legally go.
    #[must_use]
    pub fn drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let below = dropped.moved(0, 1);
            if !board.can_place(&below) {
                return dropped;
            }
            dropped = below;
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,-1")
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        )
    }
}

/// Error returned when a piece string is not in `kind#rotation@x,y` format.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece `{input}`: {reason}")]
pub struct ParsePieceError {
    input: String,
    reason: &'static str,
}

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParsePieceError {
            input: s.to_owned(),
            reason,
        };

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| error("missing '#'"))?;
        let (rotation_str, position_str) =
            rest.split_once('@').ok_or_else(|| error("missing '@'"))?;
        let (x_str, y_str) = position_str
            .split_once(',')
            .ok_or_else(|| error("missing ',' between coordinates"))?;

        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c).ok_or_else(|| error("unknown piece kind"))?,
            _ => return Err(error("piece kind must be a single character")),
        };
        let rotation = rotation_str
            .parse::<u8>()
            .ok()
            .and_then(PieceRotation::new)
            .ok_or_else(|| error("rotation must be 0-3"))?;
        let x = x_str.parse().map_err(|_| error("invalid x coordinate"))?;
        let y = y_str.parse().map_err(|_| error("invalid y coordinate"))?;

        Ok(Piece::new(kind, rotation, PiecePosition::new(x, y)))
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Position of a piece's 4×4 window on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
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
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < 4 { Some(Self(index)) } else { None }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Side length of the piece's bounding box (2, 3, or 4).
    #[must_use]
    pub const fn size(self) -> usize {
        PIECE_SHAPES[self as usize].size
    }

    /// Occupancy mask of the 4×4 window; the most significant bit is the
    /// top-left cell and bits run left to right, top to bottom.
    #[must_use]
    pub const fn mask(self, rotation: PieceRotation) -> u16 {
        PIECE_SHAPES[self as usize].masks[rotation.as_usize()]
    }

    /// Returns the `(column, row)` offsets of the occupied cells within the
    /// 4×4 window, in mask scan order.
    pub fn cells(self, rotation: PieceRotation) -> impl Iterator<Item = (u8, u8)> {
        let mask = self.mask(rotation);
        (0..16_u8)
            .filter(move |bit| mask & (0x8000 >> bit) != 0)
            .map(|bit| (bit % 4, bit / 4))
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use chromatris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character, in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// use chromatris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

struct PieceShape {
    size: usize,
    masks: [u16; 4],
}

// Indexed by `PieceKind as usize`. The O piece repeats one mask four times
// so every kind rotates through the same interface.
const PIECE_SHAPES: [PieceShape; PieceKind::LEN] = [
    PieceShape {
        size: 4,
        masks: [0x0f00, 0x2222, 0x00f0, 0x4444],
    },
    PieceShape {
        size: 3,
        masks: [0x44c0, 0x8e00, 0x6440, 0x0e20],
    },
    PieceShape {
        size: 3,
        masks: [0x4460, 0x0e80, 0xc440, 0x2e00],
    },
    PieceShape {
        size: 2,
        masks: [0xcc00, 0xcc00, 0xcc00, 0xcc00],
    },
    PieceShape {
        size: 3,
        masks: [0x06c0, 0x8c40, 0x6c00, 0x4620],
    },
    PieceShape {
        size: 3,
        masks: [0x0e40, 0x4c40, 0x4e00, 0x4640],
    },
    PieceShape {
        size: 3,
        masks: [0x0c60, 0x4c80, 0xc600, 0x2640],
    },
];
