//! Recovery weight step function.
//!
//! Maps an episode duration to a coefficient in [0, 1] modelling how much
//! restorative value the bout actually delivers: very short dozes count for
//! nothing, mid-length naps for a fraction, and anything from 90 minutes up
//! (a full cycle) for its whole duration. Exact table lookup, no
//! interpolation.

use serde::{Deserialize, Serialize};

/// Step table for the recovery weight function.
///
/// `break_points_min` are the tier lower bounds (exclusive of the implicit
/// first tier starting at 0); `weights` has one entry per tier, so it is
/// always one longer than the break points. Durations below the first break
/// point (including negative ones) take `weights[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryWeights {
    pub break_points_min: [i64; 4],
    pub weights: [f64; 5],
}

impl Default for RecoveryWeights {
    fn default() -> Self {
        Self {
            break_points_min: [10, 30, 60, 90],
            weights: [0.0, 0.3, 0.6, 0.9, 1.0],
        }
    }
}

impl RecoveryWeights {
    /// Recovery coefficient for an episode of `duration_min` minutes.
    pub fn weight(&self, duration_min: i64) -> f64 {
        self.weights[self.tier(duration_min)]
    }

    /// Index of the tier a duration falls into (0-based).
    pub fn tier(&self, duration_min: i64) -> usize {
        self.break_points_min
            .iter()
            .take_while(|&&bp| duration_min >= bp)
            .count()
    }

    /// Number of tiers in the table.
    pub fn tier_count(&self) -> usize {
        self.weights.len()
    }

    /// Human-readable duration range for a tier, e.g. `"30-59 min"`.
    pub fn tier_label(&self, tier: usize) -> String {
        let last = self.break_points_min.len();
        if tier == 0 {
            format!("< {} min", self.break_points_min[0])
        } else if tier >= last {
            format!(">= {} min", self.break_points_min[last - 1])
        } else {
            format!(
                "{}-{} min",
                self.break_points_min[tier - 1],
                self.break_points_min[tier] - 1
            )
        }
    }
}
