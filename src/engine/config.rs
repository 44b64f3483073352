use serde::{Deserialize, Serialize};

use crate::config::EngineEnvConfig;

/// Factors of the selection weight. A factor that does not apply is `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorWeights {
    pub accuracy_scale: f64,
    pub attempt_bonus_base: f64,
    pub attempt_bonus_decay: f64,
    pub recency_penalty: f64,
    pub recent_scale: f64,
    pub weakness_bonus: f64,
}

impl Default for SelectorWeights {
    fn default() -> Self {
        Self {
            accuracy_scale: 10.0,
            attempt_bonus_base: 2.0,
            attempt_bonus_decay: 0.1,
            recency_penalty: 0.5,
            recent_scale: 7.0,
            weakness_bonus: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub selector: SelectorWeights,
    /// Chance that a quick test clears the recency window before selecting.
    pub recency_reset_probability: f64,
    pub quick_test_size: usize,
    pub default_flashcard_count: usize,
    pub session_idle_timeout_mins: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selector: SelectorWeights::default(),
            recency_reset_probability: 0.15,
            quick_test_size: 10,
            default_flashcard_count: 20,
            session_idle_timeout_mins: 120,
        }
    }
}

impl EngineConfig {
    pub fn from_env(env: &EngineEnvConfig) -> Self {
        Self {
            recency_reset_probability: env.recency_reset_probability,
            quick_test_size: env.quick_test_size,
            default_flashcard_count: env.default_flashcard_count,
            session_idle_timeout_mins: env.session_idle_timeout_mins,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.recency_reset_probability) {
            return Err(format!(
                "recency_reset_probability must be within [0, 1], got {}",
                self.recency_reset_probability
            ));
        }
        if self.quick_test_size == 0 {
            return Err("quick_test_size must be positive".to_string());
        }
        if self.default_flashcard_count == 0 {
            return Err("default_flashcard_count must be positive".to_string());
        }
        if self.session_idle_timeout_mins <= 0 {
            return Err("session_idle_timeout_mins must be positive".to_string());
        }

        let w = &self.selector;
        let factors = [
            ("accuracy_scale", w.accuracy_scale),
            ("attempt_bonus_base", w.attempt_bonus_base),
            ("recency_penalty", w.recency_penalty),
            ("recent_scale", w.recent_scale),
            ("weakness_bonus", w.weakness_bonus),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("selector.{name} must be a positive number, got {value}"));
            }
        }
        if !w.attempt_bonus_decay.is_finite() || w.attempt_bonus_decay < 0.0 {
            return Err("selector.attempt_bonus_decay must be non-negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let config = EngineConfig {
            recency_reset_probability: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_penalty_is_rejected() {
        let mut config = EngineConfig::default();
        config.selector.recency_penalty = 0.0;
        assert!(config.validate().unwrap_err().contains("recency_penalty"));
    }
}
