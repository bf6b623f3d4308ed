//! Success Predictor
//!
//! `p = L(1 - S) + (1 - L)G`: mastered learners succeed unless they slip,
//! unmastered learners succeed only by guessing.

use crate::difficulty::effective_guess_slip;
use crate::sanitize::clamp01;
use crate::types::{Action, BktParams, PredictionResult};

pub fn predict_success_prob(mastery: f64, guess: f64, slip: f64) -> f64 {
    clamp01(mastery * (1.0 - slip) + (1.0 - mastery) * guess)
}

/// Predict a single action at the given prior
pub fn predict_action(
    action: &Action,
    prior: f64,
    params: &BktParams,
    difficulty_scale: f64,
) -> PredictionResult {
    let (guess, slip) = effective_guess_slip(
        action.action_difficulty,
        params.guess,
        params.slip,
        difficulty_scale,
    );

    PredictionResult {
        action_id: action.action_id.clone(),
        action_type: action.action_type.clone(),
        action_difficulty: action.action_difficulty,
        success_prediction: predict_success_prob(prior, guess, slip),
        effective_guess: guess,
        effective_slip: slip,
        prior_l: prior,
    }
}

/// Predict every action, preserving input order
pub fn predict_actions(
    actions: &[Action],
    prior: f64,
    params: &BktParams,
    difficulty_scale: f64,
) -> Vec<PredictionResult> {
    actions
        .iter()
        .map(|action| predict_action(action, prior, params, difficulty_scale))
        .collect()
}
