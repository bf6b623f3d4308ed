//! Common Types and Constants
//!
//! Shared data structures used across all engine modules. Field names follow
//! the snake_case wire format used by the prediction service.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Default transition probability T
pub const DEFAULT_TRANSITION: f64 = 0.15;

/// Default guess probability G
pub const DEFAULT_GUESS: f64 = 0.20;

/// Default slip probability S
pub const DEFAULT_SLIP: f64 = 0.10;

/// Default initial mastery L0
pub const DEFAULT_PRIOR: f64 = 0.10;

/// Difficulty assumed for actions that do not declare one
pub const NEUTRAL_DIFFICULTY: f64 = 0.5;

/// Lowest accepted action difficulty
pub const MIN_DIFFICULTY: f64 = 0.1;

/// Highest accepted action difficulty
pub const MAX_DIFFICULTY: f64 = 1.0;

/// Default lower bound of the target success band
pub const DEFAULT_TARGET_LOW: f64 = 0.4;

/// Default upper bound of the target success band
pub const DEFAULT_TARGET_HIGH: f64 = 0.6;

// ==================== BKT Parameters ====================

/// The four BKT parameters for one skill
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BktParams {
    /// Probability of learning at each opportunity (T)
    pub transition: f64,
    /// Probability of answering correctly without mastery (G)
    pub guess: f64,
    /// Probability of answering incorrectly despite mastery (S)
    pub slip: f64,
    /// Mastery assumed when nothing else is known (L0)
    pub prior: f64,
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION,
            guess: DEFAULT_GUESS,
            slip: DEFAULT_SLIP,
            prior: DEFAULT_PRIOR,
        }
    }
}

// ==================== Learner Inputs ====================

/// A theme (skill) the learner is working on, or a related one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub theme_id: String,
    /// Explicit mastery estimate [0, 1]
    #[serde(default)]
    pub mastery_coefficient: Option<f64>,
    /// Seconds already spent on the theme
    #[serde(default)]
    pub time_spent: Option<u64>,
}

impl Theme {
    pub fn new(theme_id: impl Into<String>) -> Self {
        Self {
            theme_id: theme_id.into(),
            mastery_coefficient: None,
            time_spent: None,
        }
    }

    pub fn with_mastery(mut self, mastery: f64) -> Self {
        self.mastery_coefficient = Some(mastery);
        self
    }

    pub fn with_time_spent(mut self, seconds: u64) -> Self {
        self.time_spent = Some(seconds);
        self
    }
}

/// Related themes carry the same shape as the main theme
pub type RelatedTheme = Theme;

/// Opaque action identifier, either numeric or textual on the wire
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionId {
    Number(i64),
    Text(String),
}

impl From<i64> for ActionId {
    fn from(value: i64) -> Self {
        ActionId::Number(value)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        ActionId::Text(value.to_string())
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionId::Number(n) => write!(f, "{n}"),
            ActionId::Text(s) => f.write_str(s),
        }
    }
}

/// A candidate learning activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: ActionId,
    #[serde(default)]
    pub action_type: Option<String>,
    /// Declared difficulty [0.1, 1.0]
    #[serde(default)]
    pub action_difficulty: Option<f64>,
}

impl Action {
    pub fn new(action_id: i64, difficulty: Option<f64>) -> Self {
        Self {
            action_id: ActionId::Number(action_id),
            action_type: None,
            action_difficulty: difficulty,
        }
    }
}

/// Where the learner currently is inside the theme
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerContext {
    /// 1-based lesson counter
    pub lesson_index: u32,
    #[serde(default)]
    pub total_lessons: Option<u32>,
    /// Mastery carried forward from the previous observation in this lesson
    #[serde(default)]
    pub lesson_mastery: Option<f64>,
    /// 1-based attempt counter, 1 means nothing attempted yet in this lesson
    pub action_index: u32,
}

impl Default for LearnerContext {
    fn default() -> Self {
        Self {
            lesson_index: 1,
            total_lessons: None,
            lesson_mastery: None,
            action_index: 1,
        }
    }
}

// ==================== Engine Outputs ====================

/// Per-action prediction
///
/// `prior_l` and the effective guess/slip are echoed so that a later
/// observation reproduces exactly the values used here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub action_id: ActionId,
    pub action_type: Option<String>,
    pub action_difficulty: Option<f64>,
    pub success_prediction: f64,
    pub effective_guess: f64,
    pub effective_slip: f64,
    #[serde(rename = "prior_L")]
    pub prior_l: f64,
}

/// Outcome of one attempted (or skipped) action
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub attempted: bool,
    pub correct: Option<bool>,
    #[serde(rename = "prior_L")]
    pub prior_l: f64,
    pub effective_guess: f64,
    pub effective_slip: f64,
    pub transition: f64,
}

impl ObservationRecord {
    /// Build an attempted observation from the values reported at prediction time
    pub fn from_prediction(prediction: &PredictionResult, correct: bool, transition: f64) -> Self {
        Self {
            attempted: true,
            correct: Some(correct),
            prior_l: prediction.prior_l,
            effective_guess: prediction.effective_guess,
            effective_slip: prediction.effective_slip,
            transition,
        }
    }
}
