//! Shared helpers for turning game results into search values.

use crate::rules::Outcome;
use crate::types::Color;

/// Value of a finished (or undetermined) game from White's perspective.
///
/// Returns
/// * `1.0` if White won
/// * `-1.0` if Black won
/// * `0.0` for draws and for `None` (no outcome reported)
///
/// # Example
/// ```
/// use engine_core::game_utils::outcome_value;
/// use engine_core::{Color, Outcome, Termination};
///
/// assert_eq!(outcome_value(Some(Outcome::decisive(Color::White))), 1.0);
/// assert_eq!(outcome_value(Some(Outcome::decisive(Color::Black))), -1.0);
/// assert_eq!(outcome_value(Some(Outcome::draw(Termination::Stalemate))), 0.0);
/// assert_eq!(outcome_value(None), 0.0);
/// ```
#[inline]
pub fn outcome_value(outcome: Option<Outcome>) -> f32 {
    match outcome.and_then(|o| o.winner) {
        Some(Color::White) => 1.0,
        Some(Color::Black) => -1.0,
        None => 0.0,
    }
}

/// Convert a White-relative value into the point of view of `side`.
#[inline]
pub fn relative_value(value: f32, side: Color) -> f32 {
    value * side.sign()
}
