//! The rules-engine contract consumed by the search.
//!
//! The search never computes legality itself. Everything it needs to know
//! about a position goes through a [`Rules`] implementation: legal-move
//! enumeration, move application, terminal detection and square occupants.

use std::fmt;

use crate::types::{ChessMove, Color, Piece, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors reported by a rules engine.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    /// Only reported when draw claims are requested.
    FiftyMoves,
}

/// Final result of a position, if the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub termination: Termination,
    /// `None` for draws.
    pub winner: Option<Color>,
}

impl Outcome {
    pub fn decisive(winner: Color) -> Self {
        Self {
            termination: Termination::Checkmate,
            winner: Some(winner),
        }
    }

    pub fn draw(termination: Termination) -> Self {
        Self {
            termination,
            winner: None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Chess rules collaborator.
///
/// Implementations must be deterministic: the same position always yields the
/// same legal moves in the same order. The search relies on that order to
/// break ties between equally scored edges.
pub trait Rules: Send + Sync + fmt::Debug {
    /// Parsed position. Shared read-only across the mapper's worker threads.
    type Board: Clone + Send + Sync;

    /// Parse a FEN string.
    fn parse(&self, fen: &str) -> Result<Self::Board, RulesError>;

    /// Serialize a position back to FEN.
    fn to_fen(&self, board: &Self::Board) -> String;

    fn side_to_move(&self, board: &Self::Board) -> Color;

    /// All legal moves, castling as the king's two-square move.
    fn legal_moves(&self, board: &Self::Board) -> Vec<ChessMove>;

    /// Apply a legal move, returning the resulting position. The input is untouched.
    fn play(&self, board: &Self::Board, mv: ChessMove) -> Result<Self::Board, RulesError>;

    /// Game result, or `None` while the game is still running.
    ///
    /// With `claim_draw` set, claimable draws (fifty-move rule) are reported
    /// as well as automatic ones.
    fn outcome(&self, board: &Self::Board, claim_draw: bool) -> Option<Outcome>;

    /// Occupant of a square.
    fn piece_at(&self, board: &Self::Board, square: Square) -> Option<Piece>;

    /// FEN after playing `mv` from the position `fen`.
    fn step(&self, fen: &str, mv: ChessMove) -> Result<String, RulesError> {
        let board = self.parse(fen)?;
        let next = self.play(&board, mv)?;
        Ok(self.to_fen(&next))
    }
}
