//! Parameter Set
//!
//! Default BKT parameters plus an optional per-skill table. The table is
//! consulted first; anything it does not cover falls back to the defaults.
//! Read-only once constructed, so a single instance can be shared freely.
//!
//! Table format (JSON, keyed by skill id):
//!
//! ```json
//! { "math_004": { "transition": 0.15, "guess": 0.2, "slip": 0.1, "prior": 0.1 } }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sanitize::clamp01;
use crate::types::BktParams;

impl BktParams {
    pub fn new(transition: f64, guess: f64, slip: f64, prior: f64) -> Self {
        Self {
            transition,
            guess,
            slip,
            prior,
        }
        .sanitized()
    }

    /// Copy with every field clamped into [0, 1]
    pub fn sanitized(self) -> Self {
        Self {
            transition: clamp01(self.transition),
            guess: clamp01(self.guess),
            slip: clamp01(self.slip),
            prior: clamp01(self.prior),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    defaults: BktParams,
    per_skill: HashMap<String, BktParams>,
}

impl ParameterSet {
    pub fn new(defaults: BktParams) -> Self {
        Self {
            defaults: defaults.sanitized(),
            per_skill: HashMap::new(),
        }
    }

    pub fn with_skill_table(mut self, table: HashMap<String, BktParams>) -> Self {
        self.per_skill = table
            .into_iter()
            .map(|(skill, params)| (skill, params.sanitized()))
            .collect();
        self
    }

    /// Parse a per-skill table and attach it to `defaults`
    pub fn from_json_str(defaults: BktParams, json: &str) -> Result<Self, serde_json::Error> {
        let table: HashMap<String, BktParams> = serde_json::from_str(json)?;
        Ok(Self::new(defaults).with_skill_table(table))
    }

    pub fn defaults(&self) -> BktParams {
        self.defaults
    }

    pub fn skill_count(&self) -> usize {
        self.per_skill.len()
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.per_skill.contains_key(skill_id)
    }

    /// Parameters for `skill_id`, falling back to the defaults
    pub fn resolve(&self, skill_id: &str) -> BktParams {
        self.per_skill
            .get(skill_id)
            .copied()
            .unwrap_or(self.defaults)
    }
}
