//! Translation between chess moves and the evaluator's policy vector.
//!
//! The policy is 73 planes of 8x8, flattened to `POLICY_SIZE` entries. The
//! plane encodes the move geometry; the cell inside the plane encodes the
//! origin square:
//!
//! ```text
//! planes  0..56   queen-like moves, direction * 7 + (distance - 1)
//!                 directions NW, N, NE, E, SE, S, SW, W
//! planes 56..64   knight moves, one plane per offset
//! planes 64..73   underpromotions, 64 + piece * 3 + (file_delta + 1)
//!                 piece knight = 0, bishop = 1, rook = 2
//!
//! index = plane * 64 + file(origin) * 8 + (7 - rank(origin))
//! ```
//!
//! Queen promotions share the queen-like planes with ordinary pawn pushes
//! and captures.

use std::collections::HashMap;

use engine_core::{ChessMove, PieceKind, Rules, Square};
use rayon::prelude::*;
use tracing::debug;

/// Number of move-geometry planes.
pub const NUM_PLANES: usize = 73;

/// Length of the flattened policy vector.
pub const POLICY_SIZE: usize = NUM_PLANES * 64;

const QUEEN_PLANES: usize = 56;
const KNIGHT_PLANES: usize = 8;
const UNDERPROMOTION_BASE: usize = QUEEN_PLANES + KNIGHT_PLANES;

/// (file delta, rank delta) unit steps: NW, N, NE, E, SE, S, SW, W.
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-1, 2),
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
];

const UNDERPROMOTIONS: [PieceKind; 3] = [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook];

/// Plane of a move made by `piece`.
///
/// # Panics
/// If the move has no geometry in the encoding (not a queen line, knight jump
/// or single-step underpromotion). Legal chess moves always have one.
pub fn move_plane(mv: ChessMove, piece: PieceKind) -> usize {
    let (file_delta, rank_delta) = mv.delta();

    if let Some(promotion) = mv.promotion.filter(|p| *p != PieceKind::Queen) {
        let piece_slot = UNDERPROMOTIONS
            .iter()
            .position(|p| *p == promotion)
            .unwrap_or_else(|| panic!("{} promotes to an unsupported piece", mv));
        assert!(
            (-1..=1).contains(&file_delta) && rank_delta.abs() == 1,
            "underpromotion {} is not a single pawn step",
            mv
        );
        return UNDERPROMOTION_BASE + piece_slot * 3 + (file_delta + 1) as usize;
    }

    if piece == PieceKind::Knight {
        let offset = KNIGHT_OFFSETS
            .iter()
            .position(|o| *o == (file_delta, rank_delta))
            .unwrap_or_else(|| panic!("{} is not a knight jump", mv));
        return QUEEN_PLANES + offset;
    }

    let distance = file_delta.abs().max(rank_delta.abs());
    let on_line = distance > 0
        && distance <= 7
        && (file_delta == 0 || rank_delta == 0 || file_delta.abs() == rank_delta.abs());
    assert!(on_line, "{} is not a queen-like move", mv);

    let step = (file_delta.signum(), rank_delta.signum());
    let direction = DIRECTIONS
        .iter()
        .position(|d| *d == step)
        .unwrap_or_else(|| panic!("{} has no direction", mv));
    direction * 7 + (distance as usize - 1)
}

/// Flat policy index of a move made by `piece`.
#[inline]
pub fn move_index(mv: ChessMove, piece: PieceKind) -> usize {
    let row = mv.from.file() as usize;
    let col = 7 - mv.from.rank() as usize;
    move_plane(mv, piece) * 64 + row * 8 + col
}

/// Move encoded by a flat policy index, if its geometry stays on the board.
///
/// Queen-like planes decode without a promotion piece. Underpromotions are
/// decoded only from the seventh rank (White, moving north) or the second
/// rank (Black, moving south).
pub fn decode(index: usize) -> Option<ChessMove> {
    if index >= POLICY_SIZE {
        return None;
    }
    let plane = index / 64;
    let row = (index % 64) / 8;
    let col = index % 8;
    let from = Square::new(row as u8, 7 - col as u8)?;

    if plane < QUEEN_PLANES {
        let (df, dr) = DIRECTIONS[plane / 7];
        let distance = (plane % 7 + 1) as i8;
        let to = from.offset(df * distance, dr * distance)?;
        return Some(ChessMove::new(from, to, None));
    }

    if plane < UNDERPROMOTION_BASE {
        let (df, dr) = KNIGHT_OFFSETS[plane - QUEEN_PLANES];
        let to = from.offset(df, dr)?;
        return Some(ChessMove::new(from, to, None));
    }

    let slot = plane - UNDERPROMOTION_BASE;
    let promotion = UNDERPROMOTIONS[slot / 3];
    let file_delta = (slot % 3) as i8 - 1;
    let rank_delta = match from.rank() {
        6 => 1,
        1 => -1,
        _ => return None,
    };
    let to = from.offset(file_delta, rank_delta)?;
    Some(ChessMove::new(from, to, Some(promotion)))
}

/// Look up the prior of every legal move in a full policy vector.
///
/// Index computation is fanned out across the rayon pool, one task per move;
/// the mapping is built after all tasks have joined. Entries of the policy that
/// do not belong to a legal move are dropped and the result is not
/// renormalized.
///
/// # Panics
/// If a move's origin square is empty on `board`, or `policy` is shorter than
/// `POLICY_SIZE`.
pub fn policy_to_priors<R: Rules>(
    rules: &R,
    board: &R::Board,
    moves: &[ChessMove],
    policy: &[f32],
) -> HashMap<ChessMove, f32> {
    let indexed: Vec<(ChessMove, usize)> = moves
        .par_iter()
        .map(|&mv| {
            let Some(piece) = rules.piece_at(board, mv.from) else {
                panic!("no piece on {} for move {}", mv.from, mv);
            };
            (mv, move_index(mv, piece.kind))
        })
        .collect();

    let priors: HashMap<ChessMove, f32> = indexed
        .into_iter()
        .map(|(mv, index)| (mv, policy[index]))
        .collect();

    debug!(
        moves = moves.len(),
        mass = priors.values().sum::<f32>(),
        "Mapped policy to legal moves"
    );

    priors
}
