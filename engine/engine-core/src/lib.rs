//! Core types and traits for the Gambit chess search
//!
//! This crate provides the fundamental abstractions shared by the rules
//! engine and the tree search:
//! - `Square`, `Piece`, `ChessMove`: board primitives in standard coordinates
//! - `Rules`: the rules-engine contract (legal moves, move application,
//!   terminal outcome, occupant lookup)
//! - `game_utils`: conversion from game outcomes to search values

pub mod game_utils;
pub mod rules;
pub mod types;

// Re-export main types for convenience
pub use game_utils::{outcome_value, relative_value};
pub use rules::{Outcome, Rules, RulesError, Termination, STARTING_FEN};
pub use types::{ChessMove, Color, Piece, PieceKind, Square};
