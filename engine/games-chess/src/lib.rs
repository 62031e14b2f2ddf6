//! Chess rules for the Gambit search engine
//!
//! Implements the `engine_core::Rules` contract on top of the `cozy-chess`
//! move generator, and encodes positions into the input planes consumed by
//! neural evaluators.
//!
//! # Move conventions
//!
//! `cozy-chess` encodes castling as "king captures own rook" (e1h1). The
//! search and the policy mapper work in standard coordinates where castling
//! is the king's two-square move (e1g1), so moves are converted at this
//! boundary in both directions.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Rules, STARTING_FEN};
//! use games_chess::CozyChess;
//!
//! let rules = CozyChess::new();
//! let board = rules.parse(STARTING_FEN).unwrap();
//! assert_eq!(rules.legal_moves(&board).len(), 20);
//! ```

pub mod observation;

use cozy_chess::{Board, File, Move, Piece as CozyPiece};
use engine_core::{
    ChessMove, Color, Outcome, Piece, PieceKind, Rules, RulesError, Square, Termination,
};

pub use observation::{encode_fen, encode_planes, INPUT_PLANES, INPUT_SIZE};

/// Chess rules engine backed by `cozy-chess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CozyChess;

impl CozyChess {
    pub fn new() -> Self {
        Self
    }
}

impl Rules for CozyChess {
    type Board = Board;

    fn parse(&self, fen: &str) -> Result<Board, RulesError> {
        Board::from_fen(fen, false).map_err(|e| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn to_fen(&self, board: &Board) -> String {
        board.to_string()
    }

    fn side_to_move(&self, board: &Board) -> Color {
        from_cozy_color(board.side_to_move())
    }

    fn legal_moves(&self, board: &Board) -> Vec<ChessMove> {
        let mut moves = Vec::with_capacity(64);
        board.generate_moves(|piece_moves| {
            for mv in piece_moves {
                moves.push(to_standard_move(board, mv));
            }
            false
        });
        moves
    }

    fn play(&self, board: &Board, mv: ChessMove) -> Result<Board, RulesError> {
        let cozy_move = to_cozy_move(board, mv);
        if !board.is_legal(cozy_move) {
            return Err(RulesError::IllegalMove {
                mv: mv.to_string(),
                fen: board.to_string(),
            });
        }
        let mut next = board.clone();
        next.play_unchecked(cozy_move);
        Ok(next)
    }

    fn outcome(&self, board: &Board, claim_draw: bool) -> Option<Outcome> {
        if !has_legal_moves(board) {
            return Some(if board.checkers().is_empty() {
                Outcome::draw(Termination::Stalemate)
            } else {
                // The side to move is mated
                Outcome::decisive(from_cozy_color(!board.side_to_move()))
            });
        }

        if insufficient_material(board) {
            return Some(Outcome::draw(Termination::InsufficientMaterial));
        }

        let halfmoves = board.halfmove_clock();
        if halfmoves >= 150 {
            return Some(Outcome::draw(Termination::SeventyFiveMoves));
        }
        if claim_draw && halfmoves >= 100 {
            return Some(Outcome::draw(Termination::FiftyMoves));
        }

        None
    }

    fn piece_at(&self, board: &Board, square: Square) -> Option<Piece> {
        let sq = to_cozy_square(square);
        let kind = board.piece_on(sq)?;
        let color = board.color_on(sq)?;
        Some(Piece::new(from_cozy_color(color), from_cozy_piece(kind)))
    }
}

fn has_legal_moves(board: &Board) -> bool {
    board.generate_moves(|piece_moves| !piece_moves.is_empty())
}

/// Neither side can mate: bare kings, a lone knight, or bishops that all
/// stand on one square colour.
fn insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(CozyPiece::Pawn)
        | board.pieces(CozyPiece::Rook)
        | board.pieces(CozyPiece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(CozyPiece::Knight);
    let bishops = board.pieces(CozyPiece::Bishop);
    if !knights.is_empty() {
        return knights.len() == 1 && bishops.is_empty();
    }

    let mut shades = bishops
        .into_iter()
        .map(|sq| (sq.file() as u8 + sq.rank() as u8) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}

/// Convert a generated move into standard coordinates.
fn to_standard_move(board: &Board, mv: Move) -> ChessMove {
    let mut to = mv.to;
    let is_castle = board.piece_on(mv.from) == Some(CozyPiece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if is_castle {
        let file = if (mv.to.file() as usize) > (mv.from.file() as usize) {
            File::G
        } else {
            File::C
        };
        to = cozy_chess::Square::new(file, mv.from.rank());
    }
    ChessMove::new(
        from_cozy_square(mv.from),
        from_cozy_square(to),
        mv.promotion.map(from_cozy_piece),
    )
}

/// Convert a standard-coordinate move into the cozy-chess encoding.
fn to_cozy_move(board: &Board, mv: ChessMove) -> Move {
    let from = to_cozy_square(mv.from);
    let mut to = to_cozy_square(mv.to);

    let (file_delta, rank_delta) = mv.delta();
    if board.piece_on(from) == Some(CozyPiece::King) && rank_delta == 0 && file_delta.abs() == 2 {
        let rights = board.castle_rights(board.side_to_move());
        let rook_file = if file_delta > 0 {
            rights.short
        } else {
            rights.long
        };
        if let Some(file) = rook_file {
            to = cozy_chess::Square::new(file, from.rank());
        }
    }

    Move {
        from,
        to,
        promotion: mv.promotion.map(to_cozy_piece),
    }
}

#[inline]
fn to_cozy_square(square: Square) -> cozy_chess::Square {
    cozy_chess::Square::index(square.index() as usize)
}

#[inline]
fn from_cozy_square(square: cozy_chess::Square) -> Square {
    Square::ALL[square as usize]
}

#[inline]
fn from_cozy_color(color: cozy_chess::Color) -> Color {
    match color {
        cozy_chess::Color::White => Color::White,
        cozy_chess::Color::Black => Color::Black,
    }
}

#[inline]
fn from_cozy_piece(piece: CozyPiece) -> PieceKind {
    match piece {
        CozyPiece::Pawn => PieceKind::Pawn,
        CozyPiece::Knight => PieceKind::Knight,
        CozyPiece::Bishop => PieceKind::Bishop,
        CozyPiece::Rook => PieceKind::Rook,
        CozyPiece::Queen => PieceKind::Queen,
        CozyPiece::King => PieceKind::King,
    }
}

#[inline]
fn to_cozy_piece(piece: PieceKind) -> CozyPiece {
    match piece {
        PieceKind::Pawn => CozyPiece::Pawn,
        PieceKind::Knight => CozyPiece::Knight,
        PieceKind::Bishop => CozyPiece::Bishop,
        PieceKind::Rook => CozyPiece::Rook,
        PieceKind::Queen => CozyPiece::Queen,
        PieceKind::King => CozyPiece::King,
    }
}
