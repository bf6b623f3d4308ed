//! Property-Based Tests for the BKT engine
//!
//! Tests the following invariants:
//! - Clamp: idempotent, no-op inside [0, 1]
//! - Prediction bounds and monotonicity in mastery
//! - Posterior update bounds for every outcome
//! - No-observation identity
//! - Selector always returns an element of the input, in-band when possible

use proptest::prelude::*;

use bkt_algo::types::{ActionId, ObservationRecord, PredictionResult};
use bkt_algo::{
    apply_observation, bkt_update, choose_action_by_target, clamp01, compute_prior,
    effective_guess_slip, estimate_theme_level, predict_success_prob, BktParams, EstimatorConfig,
    TargetRange, Theme,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_prob() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_difficulty() -> impl Strategy<Value = f64> {
    (1u64..=10u64).prop_map(|v| v as f64 / 10.0)
}

fn arb_theme() -> impl Strategy<Value = Theme> {
    (
        proptest::option::of(arb_prob()),
        proptest::option::of(0u64..=100_000u64),
    )
        .prop_map(|(mastery_coefficient, time_spent)| Theme {
            theme_id: "theme".to_string(),
            mastery_coefficient,
            time_spent,
        })
}

fn arb_predictions() -> impl Strategy<Value = Vec<PredictionResult>> {
    proptest::collection::vec(arb_prob(), 1..12).prop_map(|ps| {
        ps.into_iter()
            .enumerate()
            .map(|(i, p)| PredictionResult {
                action_id: ActionId::Number(i as i64),
                action_type: None,
                action_difficulty: None,
                success_prediction: p,
                effective_guess: 0.2,
                effective_slip: 0.1,
                prior_l: 0.5,
            })
            .collect()
    })
}

fn in_unit(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn clamp_is_idempotent(x in -10.0f64..10.0) {
        prop_assert_eq!(clamp01(clamp01(x)), clamp01(x));
        prop_assert!(in_unit(clamp01(x)));
    }

    #[test]
    fn clamp_is_noop_inside_unit_interval(x in arb_prob()) {
        prop_assert_eq!(clamp01(x), x);
    }

    #[test]
    fn prediction_in_unit_interval(l in arb_prob(), g in arb_prob(), s in arb_prob()) {
        prop_assert!(in_unit(predict_success_prob(l, g, s)));
    }

    #[test]
    fn prediction_monotone_in_mastery(a in arb_prob(), b in arb_prob(), g in arb_prob(), s in arb_prob()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(g + s <= 1.0);
        prop_assert!(predict_success_prob(lo, g, s) <= predict_success_prob(hi, g, s) + 1e-12);
    }

    #[test]
    fn update_in_unit_interval(
        l in arb_prob(), g in arb_prob(), s in arb_prob(), t in arb_prob(), correct in any::<bool>()
    ) {
        prop_assert!(in_unit(bkt_update(l, g, s, t, correct)));
    }

    #[test]
    fn skipped_observation_is_identity(l in arb_prob(), correct in proptest::option::of(any::<bool>())) {
        let record = ObservationRecord {
            attempted: false,
            correct,
            prior_l: l,
            effective_guess: 0.2,
            effective_slip: 0.1,
            transition: 0.15,
        };
        prop_assert_eq!(apply_observation(&record), l);
    }

    #[test]
    fn adapted_guess_slip_in_unit_interval(d in arb_difficulty(), g in arb_prob(), s in arb_prob()) {
        let (eg, es) = effective_guess_slip(Some(d), g, s, 0.6);
        prop_assert!(in_unit(eg));
        prop_assert!(in_unit(es));
        if d > 0.5 {
            prop_assert!(eg <= g && es >= s);
        } else if d < 0.5 {
            prop_assert!(eg >= g && es <= s);
        }
    }

    #[test]
    fn prior_in_unit_interval(
        theme in arb_theme(),
        related in proptest::collection::vec(arb_theme(), 0..4),
        lesson_index in 1u32..20,
        total_lessons in proptest::option::of(1u32..20),
        lesson_mastery in proptest::option::of(arb_prob()),
        action_index in 1u32..30,
    ) {
        let config = EstimatorConfig::default();
        let level = estimate_theme_level(&theme, &related, lesson_index, total_lessons, &BktParams::default(), &config);
        prop_assert!(in_unit(level));
        let prior = compute_prior(level, lesson_mastery, action_index, &config);
        prop_assert!(in_unit(prior));
    }

    #[test]
    fn selector_prefers_band(preds in arb_predictions(), low in arb_prob(), high in arb_prob()) {
        let range = TargetRange::new(low, high);
        let chosen = choose_action_by_target(&preds, range).unwrap();
        prop_assert!(preds.iter().any(|p| p.action_id == chosen.action_id));

        let any_in_band = preds.iter().any(|p| range.contains(p.success_prediction));
        if any_in_band {
            prop_assert!(range.contains(chosen.success_prediction));
        }

        let best = preds
            .iter()
            .map(|p| (p.success_prediction - range.center()).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!((chosen.success_prediction - range.center()).abs(), best);
    }
}
