//! BKT Engine
//!
//! Wires the estimator, difficulty adapter, predictor, selector and updater
//! into the two flows exposed by the service: predict and observe. The engine
//! only holds the injected parameter set and configuration, both read-only,
//! so one instance can serve any number of concurrent callers.

use serde::{Deserialize, Serialize};

use crate::difficulty::DIFFICULTY_SCALE;
use crate::estimator::{estimate_prior, EstimatorConfig};
use crate::params::ParameterSet;
use crate::predict::predict_actions;
use crate::selector::{choose_index_by_target, TargetRange};
use crate::types::{
    Action, BktParams, LearnerContext, ObservationRecord, PredictionResult, RelatedTheme, Theme,
};
use crate::update::apply_observation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub estimator: EstimatorConfig,
    pub difficulty_scale: f64,
    pub target_range: TargetRange,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            difficulty_scale: DIFFICULTY_SCALE,
            target_range: TargetRange::default(),
        }
    }
}

/// Everything needed for one prediction call
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub theme: &'a Theme,
    pub related_themes: &'a [RelatedTheme],
    pub context: LearnerContext,
    pub actions: &'a [Action],
    /// Overrides the configured band when present
    pub target_range: Option<TargetRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Parameters resolved for the theme
    pub params: BktParams,
    pub theme_level: f64,
    pub prior_l: f64,
    pub target_range: TargetRange,
    /// Index into `actions` of the chosen one, `None` when no actions were given
    pub chosen_index: Option<usize>,
    pub actions: Vec<PredictionResult>,
}

impl Prediction {
    pub fn chosen(&self) -> Option<&PredictionResult> {
        self.chosen_index.and_then(|i| self.actions.get(i))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BktEngine {
    params: ParameterSet,
    config: EngineConfig,
}

impl BktEngine {
    pub fn new(params: ParameterSet, config: EngineConfig) -> Self {
        Self { params, config }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn predict(&self, input: &PredictionInput<'_>) -> Prediction {
        let params = self.params.resolve(&input.theme.theme_id);
        let (theme_level, prior_l) = estimate_prior(
            input.theme,
            input.related_themes,
            &input.context,
            &params,
            &self.config.estimator,
        );

        let actions = predict_actions(input.actions, prior_l, &params, self.config.difficulty_scale);
        let target_range = input.target_range.unwrap_or(self.config.target_range);

        let chosen_index = choose_index_by_target(&actions, target_range);

        Prediction {
            params,
            theme_level,
            prior_l,
            target_range,
            chosen_index,
            actions,
        }
    }

    /// Updated mastery after an observation; unchanged without an outcome
    pub fn observe(&self, record: &ObservationRecord) -> f64 {
        apply_observation(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionId;

    fn engine() -> BktEngine {
        let defaults = BktParams { transition: 0.05, guess: 0.20, slip: 0.10, prior: 0.10 };
        BktEngine::new(ParameterSet::new(defaults), EngineConfig::default())
    }

    #[test]
    fn test_end_to_end_reference() {
        let engine = engine();
        let theme = Theme::new("math_001").with_mastery(0.1);
        let actions = vec![Action::new(1, Some(0.5))];
        let prediction = engine.predict(&PredictionInput {
            theme: &theme,
            related_themes: &[],
            context: LearnerContext::default(),
            actions: &actions,
            target_range: None,
        });

        assert!((prediction.theme_level - 0.1).abs() < 1e-12);
        assert!((prediction.prior_l - 0.1).abs() < 1e-12);
        let chosen = prediction.chosen().unwrap();
        assert!((chosen.success_prediction - 0.27).abs() < 1e-9);
        assert_eq!(chosen.effective_guess, 0.2);
        assert_eq!(chosen.effective_slip, 0.1);
    }

    #[test]
    fn test_observe_round_trip_from_prediction() {
        let engine = engine();
        let theme = Theme::new("math_001").with_mastery(0.1);
        let actions = vec![Action::new(1, Some(0.5))];
        let prediction = engine.predict(&PredictionInput {
            theme: &theme,
            related_themes: &[],
            context: LearnerContext::default(),
            actions: &actions,
            target_range: None,
        });

        let chosen = prediction.chosen().unwrap();
        let record = ObservationRecord::from_prediction(chosen, true, 0.05);
        let updated = engine.observe(&record);
        // num = 0.09, den = 0.09 + 0.9 * 0.2
        let posterior = 0.09 / 0.27;
        assert!((updated - (posterior + (1.0 - posterior) * 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_chosen_index_points_at_chosen_action() {
        let engine = engine();
        let theme = Theme::new("t").with_mastery(0.5);
        let actions = vec![
            Action::new(10, Some(0.1)),
            Action::new(11, Some(1.0)),
            Action::new(12, Some(0.7)),
        ];
        let prediction = engine.predict(&PredictionInput {
            theme: &theme,
            related_themes: &[],
            context: LearnerContext::default(),
            actions: &actions,
            target_range: Some(TargetRange::new(0.4, 0.6)),
        });

        let chosen = prediction.chosen().unwrap();
        let best = prediction
            .actions
            .iter()
            .map(|p| (p.success_prediction - 0.5).abs())
            .fold(f64::INFINITY, f64::min);
        assert_eq!((chosen.success_prediction - 0.5).abs(), best);
        assert_eq!(prediction.actions.len(), 3);
        assert_eq!(prediction.actions[0].action_id, ActionId::Number(10));
    }

    #[test]
    fn test_skill_table_is_used_for_theme() {
        let json = r#"{"hard_theme": {"transition": 0.1, "guess": 0.0, "slip": 0.0, "prior": 0.0}}"#;
        let params = ParameterSet::from_json_str(BktParams::default(), json).unwrap();
        let engine = BktEngine::new(params, EngineConfig::default());
        let theme = Theme::new("hard_theme");
        let actions = vec![Action::new(1, None)];
        let prediction = engine.predict(&PredictionInput {
            theme: &theme,
            related_themes: &[],
            context: LearnerContext::default(),
            actions: &actions,
            target_range: None,
        });

        assert_eq!(prediction.prior_l, 0.0);
        assert_eq!(prediction.chosen().unwrap().success_prediction, 0.0);
    }

    #[test]
    fn test_no_actions_no_choice() {
        let engine = engine();
        let theme = Theme::new("t");
        let prediction = engine.predict(&PredictionInput {
            theme: &theme,
            related_themes: &[],
            context: LearnerContext::default(),
            actions: &[],
            target_range: None,
        });
        assert!(prediction.chosen().is_none());
        assert!(prediction.actions.is_empty());
    }
}
