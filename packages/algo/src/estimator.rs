//! Prior Estimator
//!
//! Fuses the noisy mastery signals available at prediction time into a single
//! prior `L`:
//! - explicit theme mastery (or the parameter prior when absent)
//! - related-theme mastery, a weak auxiliary signal
//! - time spent on the theme, saturating at 10 hours
//! - position within the lesson track
//! - lesson-local mastery, trusted more as attempts accumulate

use serde::{Deserialize, Serialize};

use crate::sanitize::clamp01;
use crate::types::{BktParams, LearnerContext, RelatedTheme, Theme};

const RELATED_WEIGHT: f64 = 0.2;
const TIME_WEIGHT: f64 = 0.2;
const TIME_SATURATION_SECS: f64 = 36_000.0;
const PROGRESS_WEIGHT: f64 = 0.2;
const LESSON_WARMUP_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Share of the related-theme average in the blended base
    pub related_weight: f64,
    /// Shift applied at zero (-w/2) or saturated (+w/2) time on theme
    pub time_weight: f64,
    /// Time on theme at which the signal saturates (seconds)
    pub time_saturation_secs: f64,
    /// Share of lesson progress in the blended base
    pub progress_weight: f64,
    /// Attempts after which lesson mastery fully replaces the theme level
    pub lesson_warmup_attempts: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            related_weight: RELATED_WEIGHT,
            time_weight: TIME_WEIGHT,
            time_saturation_secs: TIME_SATURATION_SECS,
            progress_weight: PROGRESS_WEIGHT,
            lesson_warmup_attempts: LESSON_WARMUP_ATTEMPTS,
        }
    }
}

/// Mean of the related themes' mastery, ignoring themes without one
fn related_average(related_themes: &[RelatedTheme]) -> Option<f64> {
    let (sum, count) = related_themes
        .iter()
        .filter_map(|t| t.mastery_coefficient)
        .fold((0.0, 0usize), |(sum, count), m| (sum + m, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Theme-level mastery estimate before any lesson-local evidence
pub fn estimate_theme_level(
    theme: &Theme,
    related_themes: &[RelatedTheme],
    lesson_index: u32,
    total_lessons: Option<u32>,
    params: &BktParams,
    config: &EstimatorConfig,
) -> f64 {
    let mut base = theme.mastery_coefficient.unwrap_or(params.prior);

    if let Some(rel_avg) = related_average(related_themes) {
        base = (1.0 - config.related_weight) * base + config.related_weight * rel_avg;
    }

    if let Some(seconds) = theme.time_spent {
        let saturation = config.time_saturation_secs.max(1.0);
        let norm = (seconds as f64 / saturation).min(1.0);
        base += config.time_weight * (norm - 0.5);
    }

    if let Some(total) = total_lessons.filter(|&t| t > 0) {
        let progress = clamp01(lesson_index as f64 / total as f64);
        base = (1.0 - config.progress_weight) * base + config.progress_weight * progress;
    }

    clamp01(base)
}

/// Blend the theme level with lesson-local mastery
///
/// The lesson weight grows linearly with completed attempts and reaches 1.0
/// after `lesson_warmup_attempts`.
pub fn compute_prior(
    theme_level: f64,
    lesson_mastery: Option<f64>,
    action_index: u32,
    config: &EstimatorConfig,
) -> f64 {
    let Some(lesson_mastery) = lesson_mastery else {
        return theme_level;
    };

    let attempts_done = action_index.saturating_sub(1);
    let warmup = config.lesson_warmup_attempts.max(1) as f64;
    let w_lesson = clamp01(attempts_done as f64 / warmup);
    let w_theme = 1.0 - w_lesson;

    clamp01(w_theme * theme_level + w_lesson * lesson_mastery)
}

/// Full prior for a learner context: theme level then lesson blend
pub fn estimate_prior(
    theme: &Theme,
    related_themes: &[RelatedTheme],
    context: &LearnerContext,
    params: &BktParams,
    config: &EstimatorConfig,
) -> (f64, f64) {
    let theme_level = estimate_theme_level(
        theme,
        related_themes,
        context.lesson_index,
        context.total_lessons,
        params,
        config,
    );
    let prior = compute_prior(theme_level, context.lesson_mastery, context.action_index, config);
    (theme_level, prior)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BktParams {
        BktParams { transition: 0.05, guess: 0.20, slip: 0.10, prior: 0.10 }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_theme_mastery_only() {
        let theme = Theme::new("t").with_mastery(0.1);
        let level = estimate_theme_level(&theme, &[], 1, None, &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.1));
    }

    #[test]
    fn test_missing_mastery_uses_param_prior() {
        let theme = Theme::new("t");
        let p = BktParams { prior: 0.33, ..params() };
        let level = estimate_theme_level(&theme, &[], 1, None, &p, &EstimatorConfig::default());
        assert!(approx(level, 0.33));
    }

    #[test]
    fn test_related_themes_blend() {
        let theme = Theme::new("t").with_mastery(0.5);
        let related: Vec<RelatedTheme> = vec![
            Theme::new("r1").with_mastery(0.9),
            Theme::new("r2").with_mastery(0.7),
            Theme::new("r3"),
        ];
        let level = estimate_theme_level(&theme, &related, 1, None, &params(), &EstimatorConfig::default());
        // 0.8 * 0.5 + 0.2 * 0.8
        assert!(approx(level, 0.56));
    }

    #[test]
    fn test_related_without_mastery_is_ignored() {
        let theme = Theme::new("t").with_mastery(0.5);
        let related = vec![Theme::new("r1"), Theme::new("r2")];
        let level = estimate_theme_level(&theme, &related, 1, None, &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.5));
    }

    #[test]
    fn test_time_spent_shift() {
        let cfg = EstimatorConfig::default();
        let zero = Theme::new("t").with_mastery(0.5).with_time_spent(0);
        let half = Theme::new("t").with_mastery(0.5).with_time_spent(18_000);
        let full = Theme::new("t").with_mastery(0.5).with_time_spent(36_000);
        let over = Theme::new("t").with_mastery(0.5).with_time_spent(100_000);

        assert!(approx(estimate_theme_level(&zero, &[], 1, None, &params(), &cfg), 0.4));
        assert!(approx(estimate_theme_level(&half, &[], 1, None, &params(), &cfg), 0.5));
        assert!(approx(estimate_theme_level(&full, &[], 1, None, &params(), &cfg), 0.6));
        assert!(approx(estimate_theme_level(&over, &[], 1, None, &params(), &cfg), 0.6));
    }

    #[test]
    fn test_lesson_progress_blend() {
        let theme = Theme::new("t").with_mastery(0.5);
        let level = estimate_theme_level(&theme, &[], 5, Some(10), &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.5));

        let level = estimate_theme_level(&theme, &[], 10, Some(10), &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.6));
    }

    #[test]
    fn test_progress_beyond_total_is_clamped() {
        let theme = Theme::new("t").with_mastery(0.0);
        let level = estimate_theme_level(&theme, &[], 30, Some(10), &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.2));
    }

    #[test]
    fn test_result_is_clamped() {
        let theme = Theme::new("t").with_mastery(1.0).with_time_spent(36_000);
        let level = estimate_theme_level(&theme, &[], 1, None, &params(), &EstimatorConfig::default());
        assert_eq!(level, 1.0);

        let theme = Theme::new("t").with_mastery(0.0).with_time_spent(0);
        let level = estimate_theme_level(&theme, &[], 1, None, &params(), &EstimatorConfig::default());
        assert_eq!(level, 0.0);
    }

    #[test]
    fn test_compute_prior_without_lesson_mastery() {
        let cfg = EstimatorConfig::default();
        assert_eq!(compute_prior(0.37, None, 7, &cfg), 0.37);
    }

    #[test]
    fn test_compute_prior_first_attempt_uses_theme_level() {
        let cfg = EstimatorConfig::default();
        assert!(approx(compute_prior(0.3, Some(0.9), 1, &cfg), 0.3));
    }

    #[test]
    fn test_compute_prior_weight_grows_with_attempts() {
        let cfg = EstimatorConfig::default();
        // 5 attempts done -> half weight
        assert!(approx(compute_prior(0.2, Some(0.8), 6, &cfg), 0.5));
        // saturates after 10 attempts
        assert!(approx(compute_prior(0.2, Some(0.8), 11, &cfg), 0.8));
        assert!(approx(compute_prior(0.2, Some(0.8), 40, &cfg), 0.8));
    }

    #[test]
    fn test_compute_prior_zero_action_index() {
        let cfg = EstimatorConfig::default();
        assert!(approx(compute_prior(0.3, Some(0.9), 0, &cfg), 0.3));
    }

    #[test]
    fn test_estimate_prior_combines_both_steps() {
        let ctx = LearnerContext {
            lesson_index: 1,
            total_lessons: None,
            lesson_mastery: Some(0.6),
            action_index: 6,
        };
        let theme = Theme::new("t").with_mastery(0.2);
        let (level, prior) = estimate_prior(&theme, &[], &ctx, &params(), &EstimatorConfig::default());
        assert!(approx(level, 0.2));
        assert!(approx(prior, 0.4));
    }
}
