//! Threshold evaluation for measurement values.
//!
//! This module maps a measurement value to an actuator decision: the
//! actuator is engaged iff the value is strictly above the configured
//! threshold. Evaluation is a total function over all floating-point
//! input; non-finite values (NaN, infinity) never engage the actuator.
//!
//! # Example
//!
//! ```
//! use domo_types::{Action, ThresholdConfig, Thresholds};
//!
//! let thresholds = Thresholds::new(ThresholdConfig { threshold: 22.0 });
//! assert_eq!(thresholds.evaluate(23.5), Action::Engaged);
//! assert_eq!(thresholds.evaluate(22.0), Action::Idle);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::Action;

/// Default actuation threshold in degrees Celsius.
pub const DEFAULT_THRESHOLD: f64 = 25.0;

/// Configuration for threshold evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Values strictly above this engage the actuator.
    pub threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Threshold evaluator for measurement values.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Classify a measurement value against the configured threshold.
    pub fn evaluate(&self, value: f64) -> Action {
        evaluate(value, self.config.threshold)
    }
}

/// Classify a measurement value against an explicit threshold.
///
/// Returns [`Action::Engaged`] iff `value > threshold` (strict inequality:
/// a value exactly equal to the threshold is [`Action::Idle`]). NaN and
/// infinite values are always [`Action::Idle`].
pub fn evaluate(value: f64, threshold: f64) -> Action {
    if value.is_finite() && value > threshold {
        Action::Engaged
    } else {
        Action::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_above_engages() {
        assert_eq!(evaluate(25.01, 25.0), Action::Engaged);
        assert_eq!(evaluate(30.0, 25.0), Action::Engaged);
        assert_eq!(evaluate(-1.0, -2.0), Action::Engaged);
    }

    #[test]
    fn test_at_or_below_is_idle() {
        assert_eq!(evaluate(25.0, 25.0), Action::Idle);
        assert_eq!(evaluate(24.99, 25.0), Action::Idle);
        assert_eq!(evaluate(-10.0, 0.0), Action::Idle);
    }

    #[test]
    fn test_non_finite_values_are_idle() {
        assert_eq!(evaluate(f64::NAN, 25.0), Action::Idle);
        assert_eq!(evaluate(f64::INFINITY, 25.0), Action::Idle);
        assert_eq!(evaluate(f64::NEG_INFINITY, 25.0), Action::Idle);
    }

    #[test]
    fn test_nan_threshold_is_idle() {
        assert_eq!(evaluate(30.0, f64::NAN), Action::Idle);
    }

    #[test]
    fn test_default_threshold() {
        let t = Thresholds::default();
        assert_eq!(t.config().threshold, DEFAULT_THRESHOLD);
        assert_eq!(t.evaluate(26.0), Action::Engaged);
        assert_eq!(t.evaluate(25.0), Action::Idle);
    }

    #[test]
    fn test_custom_threshold() {
        let t = Thresholds::new(ThresholdConfig { threshold: 30.0 });
        assert_eq!(t.evaluate(29.0), Action::Idle);
        assert_eq!(t.evaluate(31.0), Action::Engaged);
    }
}
