//! Feature vectors and suggestion context.
//!
//! Two views feed the coaching layer: the numeric [`FeatureVector`] the
//! bandit scores arms against, and the richer [`SuggestionContext`] the
//! rule table reads. Both are assembled by the caller (or the coach
//! facade) from engine output plus collaborator-supplied inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Feature dimension shared by the context builder and the bandit.
pub const FEATURE_DIMENSION: usize = 3;

/// Fixed-dimension context vector:
/// `[predicted debt (hours), free time (hours), normalized chronotype]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw feature values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Assemble the bandit context.
///
/// A missing debt prediction becomes 0 hours; free time and chronotype
/// pass through unchanged (chronotype arrives already normalized to
/// [0, 1]). Total function, no failure modes.
pub fn build_context(
    predicted_debt_seconds: Option<f64>,
    free_time_hours: f64,
    chronotype: f64,
) -> FeatureVector {
    let predicted_hours = predicted_debt_seconds.map_or(0.0, |s| s / 3600.0);
    FeatureVector(vec![predicted_hours, free_time_hours, chronotype])
}

/// One day of forecast debt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtForecast {
    pub day: NaiveDate,
    pub debt_minutes: f64,
}

/// Everything the rule table looks at for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionContext {
    /// Reference day the lookahead horizon counts from.
    pub today: NaiveDate,
    /// Current acute debt, in minutes.
    pub debt_minutes: f64,
    /// Free time available right now, in minutes.
    pub free_minutes: f64,
    /// Normalized chronotype in [0, 1].
    pub chronotype: f64,
    /// Average weekend bed hour minus weekday bed hour, in minutes.
    pub weekend_shift_minutes: f64,
    /// Usual bedtime hour (0-23).
    pub usual_bed_hour: u32,
    /// Usual wake hour (0-23).
    pub usual_wake_hour: u32,
    /// Forecast debt per upcoming day, if a forecaster is available.
    pub future_debt_minutes: Vec<DebtForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_maps_seconds_to_hours() {
        let x = build_context(Some(7200.0), 1.5, 0.5);
        assert_eq!(x.as_slice(), &[2.0, 1.5, 0.5]);
        assert_eq!(x.dim(), FEATURE_DIMENSION);
    }

    #[test]
    fn test_build_context_missing_prediction_is_zero() {
        let x = build_context(None, 2.0, 1.0);
        assert_eq!(x.as_slice(), &[0.0, 2.0, 1.0]);
    }
}
