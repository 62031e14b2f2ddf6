//! Chess primitives shared by the rules engine and the search.
//!
//! Squares are numbered 0..64 with a1 = 0, b1 = 1, ..., h8 = 63, so
//! `file = index % 8` and `rank = index / 8`.

use std::fmt;
use std::str::FromStr;

use crate::rules::RulesError;

/// Side to move / piece owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// +1.0 for White, -1.0 for Black. Converts a White-relative value into
    /// this side's point of view.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Color::White => 1.0,
            Color::Black => -1.0,
        }
    }
}

/// Kind of chess piece, without color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Lowercase letter used for promotions in UCI notation.
    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece standing on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}

/// Board square, 0 (a1) to 63 (h8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    /// Every square in index order.
    pub const ALL: [Square; 64] = {
        let mut squares = [Square(0); 64];
        let mut i = 0;
        while i < 64 {
            squares[i] = Square(i as u8);
            i += 1;
        }
        squares
    };

    /// Build a square from file (0 = a) and rank (0 = first rank).
    ///
    /// Returns `None` if either coordinate is off the board.
    #[inline]
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<Square> {
        (index < 64).then_some(Square(index))
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// File 0..8 (a..h).
    #[inline]
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank 0..8 (first..eighth).
    #[inline]
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// The square `file_delta` files and `rank_delta` ranks away, if on the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Square::new(file as u8, rank as u8)
        } else {
            None
        }
    }

    /// Iterate over all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl FromStr for Square {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(RulesError::InvalidMove(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| RulesError::InvalidMove(s.to_string()))
    }
}

/// A move in standard coordinates: origin, destination and optional
/// promotion piece. Castling is the king's two-square move (e1g1, e8c8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Parse long algebraic (UCI) notation such as `e2e4` or `b7b8n`.
    pub fn from_uci(s: &str) -> Result<Self, RulesError> {
        s.parse()
    }

    /// File and rank distance from origin to destination.
    #[inline]
    pub fn delta(&self) -> (i8, i8) {
        (
            self.to.file() as i8 - self.from.file() as i8,
            self.to.rank() as i8 - self.from.rank() as i8,
        )
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}

impl FromStr for ChessMove {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(RulesError::InvalidMove(s.to_string()));
        }
        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(kind @ (PieceKind::Knight
                | PieceKind::Bishop
                | PieceKind::Rook
                | PieceKind::Queen)) => Some(kind),
                _ => return Err(RulesError::InvalidMove(s.to_string())),
            },
        };
        Ok(ChessMove::new(from, to, promotion))
    }
}
