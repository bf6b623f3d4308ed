//! Data Sanitization
//!
//! Numerical stability utilities. Every probability leaving the engine passes
//! through [`clamp01`].

/// 检查数值是否无效 (NaN 或 Inf)
pub fn is_invalid(x: f64) -> bool {
    x.is_nan() || x.is_infinite()
}

/// 将数值限制在 [low, high] 区间
///
/// NaN 落到下界。
pub fn clamp(x: f64, low: f64, high: f64) -> f64 {
    x.max(low).min(high)
}

/// 将概率限制在 [0, 1]
pub fn clamp01(x: f64) -> f64 {
    clamp(x, 0.0, 1.0)
}
