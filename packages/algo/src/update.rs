//! Posterior Updater
//!
//! Standard BKT update: Bayes' rule over the observed outcome, then the
//! learning transition. An uninformative observation (zero evidence) leaves
//! the mastery estimate unchanged before the transition is applied.

use crate::sanitize::clamp01;
use crate::types::ObservationRecord;

pub fn bkt_update(mastery: f64, guess: f64, slip: f64, transition: f64, correct: bool) -> f64 {
    let (num, den) = if correct {
        let num = mastery * (1.0 - slip);
        (num, num + (1.0 - mastery) * guess)
    } else {
        let num = mastery * slip;
        (num, num + (1.0 - mastery) * (1.0 - guess))
    };

    let posterior = if den > 0.0 { num / den } else { mastery };

    clamp01(posterior + (1.0 - posterior) * transition)
}

/// Apply an observation record; without an observed outcome the prior is returned as-is
pub fn apply_observation(record: &ObservationRecord) -> f64 {
    match (record.attempted, record.correct) {
        (true, Some(correct)) => bkt_update(
            record.prior_l,
            record.effective_guess,
            record.effective_slip,
            record.transition,
            correct,
        ),
        _ => record.prior_l,
    }
}
