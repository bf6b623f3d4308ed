//! Wire shapes of the predict and observe endpoints
//!
//! Shared by the HTTP handlers and the simulation client. Field names are
//! snake_case; mastery values use the `prior_L` / `updated_L` spelling.

use bkt_algo::{
    Action, LearnerContext, ObservationRecord, Prediction, PredictionInput, PredictionResult,
    RelatedTheme, TargetRange, Theme, DEFAULT_TRANSITION, MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub theme: Theme,
    #[serde(default)]
    pub related_themes: Vec<RelatedTheme>,
    pub lesson_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_mastery: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<u32>,
    pub action_index: u32,
    pub actions: Vec<Action>,
    /// Overrides the configured target band for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_range: Option<TargetRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub theme_id: String,
    pub lesson_index: u32,
    pub action_index: u32,
    pub chosen_action: PredictionResult,
    pub actions: Vec<PredictionResult>,
}

impl PredictResponse {
    /// `None` when the prediction carries no chosen action
    pub fn from_prediction(request: &PredictRequest, prediction: Prediction) -> Option<Self> {
        let chosen_action = prediction.chosen()?.clone();
        Some(Self {
            theme_id: request.theme.theme_id.clone(),
            lesson_index: request.lesson_index,
            action_index: request.action_index,
            chosen_action,
            actions: prediction.actions,
        })
    }
}

fn default_transition() -> f64 {
    DEFAULT_TRANSITION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveRequest {
    pub attempted: bool,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(rename = "prior_L")]
    pub prior_l: f64,
    pub effective_guess: f64,
    pub effective_slip: f64,
    #[serde(default = "default_transition")]
    pub transition: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObserveResponse {
    #[serde(rename = "updated_L")]
    pub updated_l: f64,
}

fn check_probability(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be within [0, 1], got {value}"))
    }
}

fn check_theme(field: &str, theme: &Theme) -> Result<(), String> {
    if theme.theme_id.trim().is_empty() {
        return Err(format!("{field}.theme_id must not be empty"));
    }
    if let Some(mastery) = theme.mastery_coefficient {
        check_probability(&format!("{field}.mastery_coefficient"), mastery)?;
    }
    Ok(())
}

impl PredictRequest {
    /// Boundary validation; the engine itself never rejects input
    pub fn validate(&self) -> Result<(), String> {
        check_theme("theme", &self.theme)?;
        for (i, related) in self.related_themes.iter().enumerate() {
            check_theme(&format!("related_themes[{i}]"), related)?;
        }

        if self.lesson_index < 1 {
            return Err("lesson_index must be >= 1".to_string());
        }
        if self.action_index < 1 {
            return Err("action_index must be >= 1".to_string());
        }
        if matches!(self.total_lessons, Some(0)) {
            return Err("total_lessons must be >= 1".to_string());
        }
        if let Some(mastery) = self.lesson_mastery {
            check_probability("lesson_mastery", mastery)?;
        }

        if self.actions.is_empty() {
            return Err("actions must not be empty".to_string());
        }
        for (i, action) in self.actions.iter().enumerate() {
            if let Some(difficulty) = action.action_difficulty {
                if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
                    return Err(format!(
                        "actions[{i}].action_difficulty must be within [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}], got {difficulty}"
                    ));
                }
            }
            if matches!(action.action_type.as_deref(), Some(t) if t.is_empty()) {
                return Err(format!("actions[{i}].action_type must not be empty"));
            }
        }

        Ok(())
    }

    pub fn context(&self) -> LearnerContext {
        LearnerContext {
            lesson_index: self.lesson_index,
            total_lessons: self.total_lessons,
            lesson_mastery: self.lesson_mastery,
            action_index: self.action_index,
        }
    }

    pub fn as_input(&self) -> PredictionInput<'_> {
        PredictionInput {
            theme: &self.theme,
            related_themes: &self.related_themes,
            context: self.context(),
            actions: &self.actions,
            target_range: self.target_range,
        }
    }
}

impl ObserveRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_probability("prior_L", self.prior_l)?;
        check_probability("effective_guess", self.effective_guess)?;
        check_probability("effective_slip", self.effective_slip)?;
        check_probability("transition", self.transition)?;
        Ok(())
    }
}

impl From<&ObserveRequest> for ObservationRecord {
    fn from(req: &ObserveRequest) -> Self {
        ObservationRecord {
            attempted: req.attempted,
            correct: req.correct,
            prior_l: req.prior_l,
            effective_guess: req.effective_guess,
            effective_slip: req.effective_slip,
            transition: req.transition,
        }
    }
}

impl From<ObservationRecord> for ObserveRequest {
    fn from(record: ObservationRecord) -> Self {
        ObserveRequest {
            attempted: record.attempted,
            correct: record.correct,
            prior_l: record.prior_l,
            effective_guess: record.effective_guess,
            effective_slip: record.effective_slip,
            transition: record.transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> PredictRequest {
        serde_json::from_value(json!({
            "theme": {"theme_id": "math_004", "mastery_coefficient": 0.76, "time_spent": 100},
            "related_themes": [
                {"theme_id": "math_003", "mastery_coefficient": 0.85, "time_spent": 4000},
                {"theme_id": "math_002", "mastery_coefficient": 0.72, "time_spent": 3600}
            ],
            "lesson_index": 3,
            "lesson_mastery": 0.75,
            "total_lessons": 10,
            "action_index": 5,
            "actions": [
                {"action_id": 1, "action_type": "test", "action_difficulty": 0.7},
                {"action_id": "video-2", "action_type": "video"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_actions_rejected() {
        let mut req = request();
        req.actions.clear();
        assert!(req.validate().unwrap_err().contains("actions"));
    }

    #[test]
    fn test_out_of_range_mastery_rejected() {
        let mut req = request();
        req.theme.mastery_coefficient = Some(1.2);
        assert!(req.validate().unwrap_err().contains("theme.mastery_coefficient"));

        let mut req = request();
        req.related_themes[1].mastery_coefficient = Some(-0.1);
        assert!(req.validate().unwrap_err().contains("related_themes[1]"));

        let mut req = request();
        req.lesson_mastery = Some(2.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_counters_rejected_below_one() {
        let mut req = request();
        req.lesson_index = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.action_index = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.total_lessons = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_difficulty_range() {
        let mut req = request();
        req.actions[0].action_difficulty = Some(0.05);
        assert!(req.validate().is_err());
        req.actions[0].action_difficulty = Some(1.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_theme_id_rejected() {
        let mut req = request();
        req.theme.theme_id = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_observe_transition_defaults_at_boundary() {
        let req: ObserveRequest = serde_json::from_value(json!({
            "attempted": true,
            "correct": false,
            "prior_L": 0.4,
            "effective_guess": 0.2,
            "effective_slip": 0.1
        }))
        .unwrap();
        assert_eq!(req.transition, 0.15);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_observe_rejects_bad_probability() {
        let req: ObserveRequest = serde_json::from_value(json!({
            "attempted": true,
            "correct": true,
            "prior_L": 1.5,
            "effective_guess": 0.2,
            "effective_slip": 0.1
        }))
        .unwrap();
        assert!(req.validate().unwrap_err().contains("prior_L"));
    }

    #[test]
    fn test_observe_response_field_name() {
        let body = serde_json::to_value(ObserveResponse { updated_l: 0.5 }).unwrap();
        assert_eq!(body, json!({"updated_L": 0.5}));
    }
}
