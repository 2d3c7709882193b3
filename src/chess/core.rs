//! Board primitives shared across [`crate::chess`]: files, ranks, squares,
//! colors and pieces.
//!
//! `Square` is a single total, bijective `{x, y}` value type rather than a
//! `"e2"`-style string: `x` is the file, `0..8`, `y` is the rank, `0..8`,
//! and rank `0` is White's back rank.

use std::fmt;

use strum::EnumIter;

use crate::error::GambitError;

/// Width/height of the board in squares.
pub const BOARD_WIDTH: u8 = 8;

/// A file (column) of the board, `A` = 0 .. `H` = 7.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// Converts a zero-based column index into a `File`.
    pub fn from_index(index: u8) -> Result<Self, GambitError> {
        match index {
            0 => Ok(Self::A),
            1 => Ok(Self::B),
            2 => Ok(Self::C),
            3 => Ok(Self::D),
            4 => Ok(Self::E),
            5 => Ok(Self::F),
            6 => Ok(Self::G),
            7 => Ok(Self::H),
            _ => Err(GambitError::InvalidPosition),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

/// A rank (row) of the board, rank `0` is White's back rank, `7` is
/// Black's.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    /// Converts a zero-based row index into a `Rank`.
    pub fn from_index(index: u8) -> Result<Self, GambitError> {
        match index {
            0 => Ok(Self::One),
            1 => Ok(Self::Two),
            2 => Ok(Self::Three),
            3 => Ok(Self::Four),
            4 => Ok(Self::Five),
            5 => Ok(Self::Six),
            6 => Ok(Self::Seven),
            7 => Ok(Self::Eight),
            _ => Err(GambitError::InvalidPosition),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// A square on the 8x8 board. Equality and conversions are total and
/// bijective: every `(x, y)` pair with `x, y < 8` is a valid square and no
/// two distinct pairs are equal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Square {
    /// File, `0` = a-file .. `7` = h-file.
    pub x: u8,
    /// Rank, `0` = White's back rank .. `7` = Black's back rank.
    pub y: u8,
}

impl Square {
    /// Builds a square from raw coordinates, rejecting anything off-board.
    pub fn new(x: u8, y: u8) -> Result<Self, GambitError> {
        if x < BOARD_WIDTH && y < BOARD_WIDTH {
            Ok(Self { x, y })
        } else {
            Err(GambitError::InvalidPosition)
        }
    }

    /// Builds a square from its file and rank.
    #[must_use]
    pub fn from_file_rank(file: File, rank: Rank) -> Self {
        Self {
            x: file as u8,
            y: rank as u8,
        }
    }

    #[must_use]
    pub fn file(self) -> File {
        File::from_index(self.x).expect("Square invariant: x < 8")
    }

    #[must_use]
    pub fn rank(self) -> Rank {
        Rank::from_index(self.y).expect("Square invariant: y < 8")
    }

    /// Iterates every square on the board, a8..h1 order is not guaranteed.
    pub fn iter_all() -> impl Iterator<Item = Self> {
        (0..BOARD_WIDTH).flat_map(|y| (0..BOARD_WIDTH).map(move |x| Self { x, y }))
    }

    /// Offsets this square by `(dx, dy)`, returning `None` if the result
    /// falls off the board.
    #[must_use]
    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let nx = i16::from(self.x) + i16::from(dx);
        let ny = i16::from(self.y) + i16::from(dy);
        if (0..i16::from(BOARD_WIDTH)).contains(&nx) && (0..i16::from(BOARD_WIDTH)).contains(&ny) {
            Some(Self {
                x: u8::try_from(nx).expect("bounds checked above"),
                y: u8::try_from(ny).expect("bounds checked above"),
            })
        } else {
            None
        }
    }

    /// Chebyshev (ray) distance between two squares that lie on a common
    /// rank, file or diagonal. Callers are expected to only invoke this on
    /// such pairs (retreat/ray geometry already guarantees it).
    #[must_use]
    pub fn ray_distance(self, other: Self) -> u8 {
        let dx = (i16::from(self.x) - i16::from(other.x)).unsigned_abs();
        let dy = (i16::from(self.y) - i16::from(other.y)).unsigned_abs();
        dx.max(dy) as u8
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// A player color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// White's back rank is `0`, Black's is `7`.
    #[must_use]
    pub fn back_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Direction (in `+y`) pawns of this color advance.
    #[must_use]
    pub fn pawn_direction(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

/// A piece type, independent of color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, serde::Serialize, serde::Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Classical material value: `P=1, N=B=3, R=5, Q=9, K=0`.
    /// This doubles as a piece's duel allocation capacity.
    #[must_use]
    pub fn classical_value(self) -> u32 {
        match self {
            Self::Pawn => 1,
            Self::Knight | Self::Bishop => 3,
            Self::Rook => 5,
            Self::Queen => 9,
            Self::King => 0,
        }
    }

    /// A piece is long-range iff it is a bishop, rook or queen.
    #[must_use]
    pub fn is_long_range(self) -> bool {
        matches!(self, Self::Bishop | Self::Rook | Self::Queen)
    }

    /// Legal promotion targets for a pawn reaching the last rank: queen,
    /// rook, bishop or knight.
    #[must_use]
    pub fn is_legal_promotion(self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop | Self::Knight)
    }
}

/// Stable identifier for a piece, retained even after capture.
pub type PieceId = u32;

/// A single piece. `position` is `None` iff the piece has been captured;
/// captured pieces retain their `id` and appear in `Board::captures`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Piece {
    /// Stable id, unique within a game, unchanged by capture.
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    /// `None` iff captured.
    pub position: Option<Square>,
    pub has_moved: bool,
    /// Move number of this piece's first move, if any.
    pub first_move_turn: Option<u32>,
    /// Move number of this piece's most recent move, if any.
    pub last_move_turn: Option<u32>,
}

impl Piece {
    #[must_use]
    pub fn new(id: PieceId, kind: PieceKind, color: Color, position: Square) -> Self {
        Self {
            id,
            kind,
            color,
            position: Some(position),
            has_moved: false,
            first_move_turn: None,
            last_move_turn: None,
        }
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.position.is_none()
    }

    /// Records that this piece has just executed a move on `turn`, per the
    /// `hasMoved`/`firstMoveTurn`/`lastMoveTurn` bookkeeping this mirrors.
    pub fn record_move(&mut self, to: Square, turn: u32) {
        self.position = Some(to);
        if !self.has_moved {
            self.first_move_turn = Some(turn);
        }
        self.has_moved = true;
        self.last_move_turn = Some(turn);
    }
}
