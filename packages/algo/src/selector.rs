//! Action Selector
//!
//! Picks the action whose predicted success is closest to the centre of a
//! target band, preferring actions that fall inside the band. Ties keep the
//! earliest action in input order, so selection is deterministic.

use serde::{Deserialize, Serialize};

use crate::sanitize::clamp01;
use crate::types::{PredictionResult, DEFAULT_TARGET_HIGH, DEFAULT_TARGET_LOW};

/// Desired success probability band, `(low, high)` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
}

impl TargetRange {
    /// Clamp both ends into [0, 1] and order them
    pub fn new(low: f64, high: f64) -> Self {
        let (low, high) = (clamp01(low), clamp01(high));
        if low > high {
            Self { low: high, high: low }
        } else {
            Self { low, high }
        }
    }

    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn contains(&self, p: f64) -> bool {
        p >= self.low && p <= self.high
    }
}

impl Default for TargetRange {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_LOW, DEFAULT_TARGET_HIGH)
    }
}

impl From<(f64, f64)> for TargetRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self::new(low, high)
    }
}

impl From<TargetRange> for (f64, f64) {
    fn from(range: TargetRange) -> Self {
        (range.low, range.high)
    }
}

/// Index of the first candidate with minimal distance to `center`
fn closest_to<'a, I>(candidates: I, center: f64) -> Option<usize>
where
    I: Iterator<Item = (usize, &'a PredictionResult)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, prediction) in candidates {
        let distance = (prediction.success_prediction - center).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Position of the prediction best matching `target_range`
///
/// Returns `None` only when `predictions` is empty.
pub fn choose_index_by_target(
    predictions: &[PredictionResult],
    target_range: TargetRange,
) -> Option<usize> {
    let range = TargetRange::new(target_range.low, target_range.high);
    let center = range.center();

    let any_in_band = predictions
        .iter()
        .any(|p| range.contains(p.success_prediction));

    let candidates = predictions.iter().enumerate();
    if any_in_band {
        closest_to(
            candidates.filter(|(_, p)| range.contains(p.success_prediction)),
            center,
        )
    } else {
        closest_to(candidates, center)
    }
}

pub fn choose_action_by_target(
    predictions: &[PredictionResult],
    target_range: TargetRange,
) -> Option<&PredictionResult> {
    choose_index_by_target(predictions, target_range).map(|i| &predictions[i])
}
