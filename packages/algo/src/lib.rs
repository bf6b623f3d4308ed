//! # bkt-algo - Bayesian Knowledge Tracing engine
//!
//! 本 crate 提供纯 Rust 实现的 BKT 预测引擎:
//!
//! - **Prior Estimator** - 融合主题掌握度、相关主题、学习时长、课程进度和课内掌握度
//! - **Difficulty Adapter** - 按动作难度调整 guess / slip
//! - **Success Predictor** - 计算动作成功概率
//! - **Action Selector** - 选择最接近目标区间中心的动作
//! - **Posterior Updater** - 根据观测结果做贝叶斯更新
//!
//! ## 设计理念
//!
//! - **纯函数** - 无 I/O、无全局状态，参数集在构造时注入
//! - **不拒绝输入** - 越界概率一律截断到 [0, 1]，输入校验由服务边界负责
//! - **充分测试** - 每个模块都有单元测试，性质测试位于 `tests/`
//!
//! ## 模块结构
//!
//! - [`estimator`] - 先验估计
//! - [`difficulty`] - 难度适配
//! - [`predict`] - 成功概率预测
//! - [`selector`] - 目标区间动作选择
//! - [`update`] - 后验更新
//! - [`params`] - BKT 参数集 (默认值 + 按技能覆盖)
//! - [`engine`] - 预测 / 观测流程
//! - [`simulation`] - 学生模拟模型
//! - [`sanitize`] - 数值截断
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use bkt_algo::{Action, BktEngine, LearnerContext, PredictionInput, Theme};
//!
//! let engine = BktEngine::default();
//! let theme = Theme::new("math_004").with_mastery(0.4);
//! let actions = vec![Action::new(1, Some(0.3)), Action::new(2, Some(0.8))];
//!
//! let prediction = engine.predict(&PredictionInput {
//!     theme: &theme,
//!     related_themes: &[],
//!     context: LearnerContext::default(),
//!     actions: &actions,
//!     target_range: None,
//! });
//! assert!(prediction.chosen().is_some());
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod sanitize;
pub mod types;
pub mod params;
pub mod estimator;
pub mod difficulty;
pub mod predict;
pub mod selector;
pub mod update;
pub mod engine;
pub mod simulation;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use sanitize::{clamp, clamp01, is_invalid};
pub use params::ParameterSet;
pub use estimator::{compute_prior, estimate_theme_level, EstimatorConfig};
pub use difficulty::effective_guess_slip;
pub use predict::predict_success_prob;
pub use selector::{choose_action_by_target, TargetRange};
pub use update::{apply_observation, bkt_update};
pub use engine::{BktEngine, EngineConfig, Prediction, PredictionInput};
pub use simulation::{Simulation, SimulationConfig};
