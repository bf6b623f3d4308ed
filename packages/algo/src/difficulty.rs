//! Difficulty Adapter
//!
//! Harder actions lower the chance of a lucky guess and raise the chance of a
//! slip; easier actions do the opposite. Neutral difficulty (0.5) leaves the
//! base parameters untouched.

use crate::sanitize::{clamp, clamp01};
use crate::types::{MAX_DIFFICULTY, MIN_DIFFICULTY, NEUTRAL_DIFFICULTY};

/// Default strength of the difficulty adjustment
pub const DIFFICULTY_SCALE: f64 = 0.6;

/// Difficulty actually used for adaptation: defaulted and clamped to [0.1, 1.0]
pub fn normalize_difficulty(action_difficulty: Option<f64>) -> f64 {
    clamp(
        action_difficulty.unwrap_or(NEUTRAL_DIFFICULTY),
        MIN_DIFFICULTY,
        MAX_DIFFICULTY,
    )
}

/// Effective (guess, slip) for an action of the given difficulty
pub fn effective_guess_slip(
    action_difficulty: Option<f64>,
    base_guess: f64,
    base_slip: f64,
    scale: f64,
) -> (f64, f64) {
    let centered = normalize_difficulty(action_difficulty) - NEUTRAL_DIFFICULTY;
    let guess = clamp01(base_guess * (1.0 - scale * centered));
    let slip = clamp01(base_slip * (1.0 + scale * centered));
    (guess, slip)
}
