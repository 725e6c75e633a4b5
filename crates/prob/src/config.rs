//! Numerical settings shared by the inference engines.

use serde::{Deserialize, Serialize};

use crate::error::ProbError;

/// What to do when a CPT row or entry is not defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCptPolicy {
    /// Fail with [`ProbError::MissingCptEntry`].
    #[default]
    Strict,
    /// Use probability 0 and emit a warning.
    Zero,
}

/// Tolerances, caps and floors used by the algorithms.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use probgraph_prob::InferenceConfig;
///
/// let config = InferenceConfig::from_json(r#"{ "max_iterations": 50 }"#).unwrap();
/// assert_eq!(config.max_iterations, 50);
/// assert_eq!(config.stationary_tolerance, 1e-4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Component-wise threshold for stationary-distribution convergence.
    pub stationary_tolerance: f64,
    /// Power-iteration cap.
    pub max_iterations: usize,
    /// Allowed deviation of a transition row sum from 1.
    pub transition_sum_tolerance: f64,
    /// Value used for transition/emission entries that are not declared.
    pub missing_probability_floor: f64,
    /// Lower bound on the forward-backward normalizer.
    pub normalizer_floor: f64,
    /// Handling of undefined CPT entries.
    pub missing_cpt: MissingCptPolicy,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            stationary_tolerance: 1e-4,
            max_iterations: 1000,
            transition_sum_tolerance: 0.01,
            missing_probability_floor: 1e-10,
            normalizer_floor: 1e-10,
            missing_cpt: MissingCptPolicy::Strict,
        }
    }
}

impl InferenceConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ProbError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ProbError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ProbError> {
        let positive = [
            ("stationary_tolerance", self.stationary_tolerance),
            ("transition_sum_tolerance", self.transition_sum_tolerance),
            ("missing_probability_floor", self.missing_probability_floor),
            ("normalizer_floor", self.normalizer_floor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProbError::InvalidConfig {
                    reason: format!("{name} must be a positive finite number, got {value}"),
                });
            }
        }
        if self.missing_probability_floor > 1.0 {
            return Err(ProbError::InvalidConfig {
                reason: "missing_probability_floor must not exceed 1".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(ProbError::InvalidConfig {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
