//! Neural network input encoding for chess positions.
//!
//! A position becomes `INPUT_PLANES` planes of 8x8 floats, laid out
//! `[plane][7 - rank][file]` so that the eighth rank is the first row:
//!
//! | plane  | content                                       |
//! |--------|-----------------------------------------------|
//! | 0      | side to move (all ones for White)             |
//! | 1..5   | castling rights: White short/long, Black short/long |
//! | 5      | fifty-move rule claimable                     |
//! | 6..12  | White pawn, knight, bishop, rook, queen, king |
//! | 12..18 | Black pieces, same order                      |
//! | 18     | en passant target square                      |

use cozy_chess::{Board, Color, Piece, Rank, Square};
use engine_core::{Rules, RulesError};

use crate::CozyChess;

/// Number of input planes.
pub const INPUT_PLANES: usize = 19;

/// Flattened input length.
pub const INPUT_SIZE: usize = INPUT_PLANES * 64;

const TURN_PLANE: usize = 0;
const CASTLING_PLANE: usize = 1;
const FIFTY_MOVE_PLANE: usize = 5;
const PIECE_PLANE: usize = 6;
const EN_PASSANT_PLANE: usize = 18;

#[inline]
fn cell(plane: usize, square: Square) -> usize {
    plane * 64 + (7 - square.rank() as usize) * 8 + square.file() as usize
}

fn fill_plane(planes: &mut [f32], plane: usize) {
    planes[plane * 64..(plane + 1) * 64].fill(1.0);
}

/// Encode a position into a flat `INPUT_SIZE` vector.
pub fn encode_planes(board: &Board) -> Vec<f32> {
    let mut planes = vec![0.0f32; INPUT_SIZE];

    if board.side_to_move() == Color::White {
        fill_plane(&mut planes, TURN_PLANE);
    }

    for (i, color) in [Color::White, Color::Black].into_iter().enumerate() {
        let rights = board.castle_rights(color);
        if rights.short.is_some() {
            fill_plane(&mut planes, CASTLING_PLANE + i * 2);
        }
        if rights.long.is_some() {
            fill_plane(&mut planes, CASTLING_PLANE + i * 2 + 1);
        }
    }

    if board.halfmove_clock() >= 100 {
        fill_plane(&mut planes, FIFTY_MOVE_PLANE);
    }

    for (c, color) in [Color::White, Color::Black].into_iter().enumerate() {
        for (p, piece) in Piece::ALL.into_iter().enumerate() {
            let plane = PIECE_PLANE + c * 6 + p;
            for square in board.colored_pieces(color, piece) {
                planes[cell(plane, square)] = 1.0;
            }
        }
    }

    if let Some(file) = board.en_passant() {
        let rank = match board.side_to_move() {
            Color::White => Rank::Sixth,
            Color::Black => Rank::Third,
        };
        planes[cell(EN_PASSANT_PLANE, Square::new(file, rank))] = 1.0;
    }

    planes
}

/// Parse `fen` and encode it.
pub fn encode_fen(fen: &str) -> Result<Vec<f32>, RulesError> {
    let board = CozyChess.parse(fen)?;
    Ok(encode_planes(&board))
}
