//! Student Simulation
//!
//! A synthetic learner walking through a track of lessons. Used to drive the
//! engine repeatedly and produce mastery trajectories. The model only decides
//! what the learner does; predictions and updates come from whoever drives it
//! (the HTTP service or an in-process [`crate::BktEngine`]).
//!
//! Behaviour per step:
//! - the learner engages with the chosen action with probability
//!   `engagement_prob`
//! - success is drawn from the predicted probability plus ±0.10 noise
//! - the lesson ends once mastery reaches the lesson target after the minimum
//!   number of attempts, or when the lesson's attempt budget runs out

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::sanitize::clamp01;
use crate::types::{Action, ActionId, LearnerContext, PredictionResult, Theme};

pub const ACTION_TYPES: [&str; 5] = ["test", "practice", "article", "video", "hint"];

const PREDICTION_NOISE: f64 = 0.10;
const THEME_RETENTION: f64 = 0.92;
const NEXT_LESSON_JITTER_LOW: f64 = -0.15;
const NEXT_LESSON_JITTER_HIGH: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub total_lessons: u32,
    pub actions_per_step: usize,
    pub min_actions_per_lesson: u32,
    /// Transition reported with every observation
    pub transition: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_lessons: 10,
            actions_per_step: 6,
            min_actions_per_lesson: 8,
            transition: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackLesson {
    pub mastery_target: f64,
    pub max_actions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentState {
    pub engagement_prob: f64,
    pub theme_id: String,
    pub theme_mastery: f64,
    pub theme_time_spent_s: u64,
    pub related_themes: Vec<Theme>,
    pub lesson_index: u32,
    pub total_lessons: u32,
    pub lesson_mastery: f64,
    pub action_index: u32,
}

/// Learner position captured before and after each step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub lesson_index: u32,
    pub action_index: u32,
    pub attempts_done: u32,
    pub lesson_mastery: f64,
    pub theme_mastery: f64,
}

/// What the learner did with the chosen action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub attempted: bool,
    pub success: Option<bool>,
    pub p_success: Option<f64>,
    pub minutes_spent: u32,
}

/// Minutes spent on an action: per-type base plus up to 4 for difficulty
pub fn step_minutes(action_type: &str, difficulty: f64) -> u32 {
    let base = match action_type {
        "hint" => 2,
        "article" => 6,
        "video" => 8,
        "practice" => 7,
        "test" => 10,
        _ => 6,
    };
    base + (4.0 * difficulty).round().max(0.0) as u32
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

pub struct Simulation {
    rng: ChaCha8Rng,
    config: SimulationConfig,
    track: Vec<TrackLesson>,
    student: StudentState,
    completed_lessons: u32,
}

impl Simulation {
    /// New learner and lesson track; `seed` makes the run reproducible
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let total_lessons = config.total_lessons.max(1);

        let track = (0..total_lessons)
            .map(|_| TrackLesson {
                mastery_target: rng.gen_range(0.85..=0.95),
                max_actions: rng.gen_range(10..=16),
            })
            .collect();

        let engagement_prob = rng.gen_range(0.85..=0.98);
        let theme_id = format!("theme_{:03}", rng.gen_range(1..=999));
        let theme_mastery = rng.gen_range(0.05..=0.20);
        let related_count = rng.gen_range(2..=4);
        let related_themes = (0..related_count)
            .map(|_| Theme {
                theme_id: format!("rel_{:03}", rng.gen_range(1..=999)),
                mastery_coefficient: Some(round3(rng.gen_range(0.1..=0.95))),
                time_spent: Some(rng.gen_range(0..=14_400)),
            })
            .collect();
        let lesson_mastery = rng.gen_range(0.0..=0.15);

        let student = StudentState {
            engagement_prob,
            theme_id,
            theme_mastery,
            theme_time_spent_s: 0,
            related_themes,
            lesson_index: 1,
            total_lessons,
            lesson_mastery,
            action_index: 1,
        };

        Self {
            rng,
            config,
            track,
            student,
            completed_lessons: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn student(&self) -> &StudentState {
        &self.student
    }

    pub fn track(&self) -> &[TrackLesson] {
        &self.track
    }

    pub fn completed_lessons(&self) -> u32 {
        self.completed_lessons
    }

    /// Whether every lesson of the track has been completed
    pub fn is_done(&self) -> bool {
        self.student.lesson_index > self.student.total_lessons
    }

    pub fn current_lesson(&self) -> Option<&TrackLesson> {
        let index = self.student.lesson_index.checked_sub(1)? as usize;
        self.track.get(index)
    }

    pub fn snapshot(&self) -> StudentSnapshot {
        StudentSnapshot {
            lesson_index: self.student.lesson_index,
            action_index: self.student.action_index,
            attempts_done: self.student.action_index.saturating_sub(1),
            lesson_mastery: self.student.lesson_mastery,
            theme_mastery: self.student.theme_mastery,
        }
    }

    /// Random candidate actions, difficulty on the 0.1 grid
    pub fn generate_actions(&mut self) -> Vec<Action> {
        (0..self.config.actions_per_step)
            .map(|i| {
                let action_type = ACTION_TYPES[self.rng.gen_range(0..ACTION_TYPES.len())];
                let difficulty = self.rng.gen_range(1..=10) as f64 / 10.0;
                Action {
                    action_id: ActionId::Number(i as i64 + 1),
                    action_type: Some(action_type.to_string()),
                    action_difficulty: Some(difficulty),
                }
            })
            .collect()
    }

    /// The main theme as reported to the predictor
    pub fn theme(&self) -> Theme {
        Theme {
            theme_id: self.student.theme_id.clone(),
            mastery_coefficient: Some(round3(self.student.theme_mastery)),
            time_spent: Some(self.student.theme_time_spent_s),
        }
    }

    pub fn related_themes(&self) -> &[Theme] {
        &self.student.related_themes
    }

    pub fn context(&self) -> LearnerContext {
        LearnerContext {
            lesson_index: self.student.lesson_index,
            total_lessons: Some(self.student.total_lessons),
            lesson_mastery: Some(round3(self.student.lesson_mastery)),
            action_index: self.student.action_index,
        }
    }

    /// Let the learner react to the chosen action
    ///
    /// An attempt advances `action_index` and time on theme; the caller is
    /// expected to report it and feed the result to [`Simulation::record_mastery`].
    pub fn attempt(&mut self, chosen: &PredictionResult) -> Attempt {
        let attempted = self.rng.gen::<f64>() <= self.student.engagement_prob;
        if !attempted {
            return Attempt {
                attempted: false,
                success: None,
                p_success: None,
                minutes_spent: 0,
            };
        }

        self.student.action_index += 1;

        let noise = self.rng.gen_range(-PREDICTION_NOISE..=PREDICTION_NOISE);
        let p_success = clamp01(clamp01(chosen.success_prediction) + noise);
        let success = self.rng.gen::<f64>() < p_success;

        let minutes_spent = step_minutes(
            chosen.action_type.as_deref().unwrap_or("practice"),
            chosen.action_difficulty.unwrap_or(0.5),
        );
        self.student.theme_time_spent_s += minutes_spent as u64 * 60;

        Attempt {
            attempted: true,
            success: Some(success),
            p_success: Some(p_success),
            minutes_spent,
        }
    }

    /// Carry the updated mastery forward into lesson and theme state
    pub fn record_mastery(&mut self, updated_l: f64) {
        self.student.lesson_mastery = updated_l;
        self.student.theme_mastery = clamp01(
            THEME_RETENTION * self.student.theme_mastery
                + (1.0 - THEME_RETENTION) * self.student.lesson_mastery,
        );
    }

    /// Close the step; returns whether the current lesson was completed
    pub fn finish_step(&mut self) -> bool {
        let Some(lesson) = self.current_lesson().copied() else {
            return false;
        };
        let attempts_done = self.student.action_index.saturating_sub(1);

        let lesson_done = (self.student.lesson_mastery >= lesson.mastery_target
            && attempts_done >= self.config.min_actions_per_lesson)
            || attempts_done >= lesson.max_actions;

        if lesson_done {
            self.completed_lessons += 1;
            self.student.lesson_index += 1;
            self.student.action_index = 1;
            let jitter = self
                .rng
                .gen_range(NEXT_LESSON_JITTER_LOW..=NEXT_LESSON_JITTER_HIGH);
            self.student.lesson_mastery = clamp01(self.student.theme_mastery + jitter);
        }

        lesson_done
    }
}
