//! LinUCB contextual bandit over coaching actions.
//!
//! Disjoint per-arm linear models: each arm keeps a ridge-regularized
//! inverse covariance matrix `Ainv` (initialized to identity) and a reward
//! accumulator `b` (initialized to zero). Selection scores every arm with
//! mean plus an upper-confidence bonus and takes the argmax; updates apply
//! the Sherman-Morrison rank-1 formula so no matrix is ever re-inverted.
//!
//! Matrices are stored flat in row-major order, indexed `i * d + j`.
//!
//! Dimension mismatches between a live context vector and the configured
//! dimension are caller bugs and panic. Shape problems in state restored
//! from disk are data-quality issues and come back as [`StateError`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::{FeatureVector, FEATURE_DIMENSION};
use crate::error::{StateError, ValidationError};

/// Coaching actions the bandit chooses between.
///
/// Declaration order doubles as the tie-break order: on equal scores the
/// earliest declared arm wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arm {
    /// Move bedtime earlier tonight.
    AdvanceBedtime,
    /// Take a short nap now.
    ShortNap,
    /// Keep the current routine steady.
    ReinforceRoutine,
}

impl Arm {
    /// All arms in declaration (tie-break) order.
    pub const ALL: [Arm; 3] = [Arm::AdvanceBedtime, Arm::ShortNap, Arm::ReinforceRoutine];

    pub fn as_str(self) -> &'static str {
        match self {
            Arm::AdvanceBedtime => "advance-bedtime",
            Arm::ShortNap => "short-nap",
            Arm::ReinforceRoutine => "reinforce-routine",
        }
    }

    fn index(self) -> usize {
        match self {
            Arm::AdvanceBedtime => 0,
            Arm::ShortNap => 1,
            Arm::ReinforceRoutine => 2,
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Arm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arm::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "arm".to_string(),
                message: format!("unknown arm '{s}'"),
            })
    }
}

/// Bandit tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BanditConfig {
    /// Exploration coefficient on the confidence bonus.
    pub alpha: f64,

    /// Feature vector dimension.
    pub dimension: usize,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            dimension: FEATURE_DIMENSION,
        }
    }
}

/// Ridge-regression sufficient state for one arm.
///
/// Mutated only by [`LinUcbBandit::update`]; everything else reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmStatistics {
    a_inv: Vec<f64>,
    b: Vec<f64>,
    updates: usize,
}

impl ArmStatistics {
    fn fresh(dimension: usize) -> Self {
        Self {
            a_inv: identity(dimension),
            b: vec![0.0; dimension],
            updates: 0,
        }
    }

    /// Row-major `Ainv` matrix.
    pub fn a_inv(&self) -> &[f64] {
        &self.a_inv
    }

    /// Reward accumulator `b`.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Model coefficients `theta = Ainv * b`.
    fn theta(&self, dimension: usize) -> Vec<f64> {
        mat_vec(&self.a_inv, &self.b, dimension)
    }
}

/// Score components for one arm against one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmScore {
    pub arm: Arm,
    /// Predicted mean reward `theta . x`.
    pub mean: f64,
    /// Confidence bonus `alpha * sqrt(x . Ainv x)`.
    pub exploration_bonus: f64,
    /// `mean + exploration_bonus`.
    pub score: f64,
}

/// Per-arm summary for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmSummary {
    pub arm: Arm,
    pub updates: usize,
    pub theta: Vec<f64>,
}

/// Serializable bandit state for persistence across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditState {
    pub config: BanditConfig,
    pub arms: Vec<ArmStatistics>,
    pub total_updates: usize,
}

/// Disjoint-arm LinUCB learner.
#[derive(Debug, Clone)]
pub struct LinUcbBandit {
    config: BanditConfig,
    arms: Vec<ArmStatistics>,
    total_updates: usize,
}

impl LinUcbBandit {
    /// Bandit with default tunables.
    pub fn new() -> Self {
        Self::with_config(BanditConfig::default())
    }

    pub fn with_config(config: BanditConfig) -> Self {
        let arms = Arm::ALL
            .iter()
            .map(|_| ArmStatistics::fresh(config.dimension))
            .collect();
        Self {
            config,
            arms,
            total_updates: 0,
        }
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    /// Score every arm against a context, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if the context dimension does not match the configured
    /// dimension; that is a caller bug, not a data problem.
    pub fn evaluate(&self, context: &FeatureVector) -> Vec<ArmScore> {
        let d = self.check_dimension(context);
        let x = context.as_slice();
        Arm::ALL
            .iter()
            .map(|&arm| {
                let state = &self.arms[arm.index()];
                let mean = dot(&state.theta(d), x);
                let a_inv_x = mat_vec(&state.a_inv, x, d);
                // Floating drift can push a tiny variance below zero.
                let variance = dot(x, &a_inv_x).max(0.0);
                let bonus = self.config.alpha * variance.sqrt();
                ArmScore {
                    arm,
                    mean,
                    exploration_bonus: bonus,
                    score: mean + bonus,
                }
            })
            .collect()
    }

    /// Upper-confidence-bound arm choice. Ties go to the earliest declared
    /// arm.
    pub fn select_arm(&self, context: &FeatureVector) -> Arm {
        let scores = self.evaluate(context);
        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }
        best.arm
    }

    /// Fold an observed reward into the chosen arm's model.
    ///
    /// Sherman-Morrison rank-1 update of `Ainv`, plus `b += reward * x`.
    ///
    /// # Panics
    ///
    /// Panics on a context dimension mismatch, or if the update
    /// denominator is not positive. The denominator is >= 1 for any
    /// positive-definite `Ainv`, so a non-positive value means the state
    /// was corrupted and continuing would silently poison the model.
    pub fn update(&mut self, arm: Arm, reward: f64, context: &FeatureVector) {
        let d = self.check_dimension(context);
        let x = context.as_slice();
        let state = &mut self.arms[arm.index()];

        let a_inv_x = mat_vec(&state.a_inv, x, d);
        let denom = 1.0 + dot(x, &a_inv_x);
        assert!(
            denom > 0.0,
            "Sherman-Morrison denominator must be positive, got {denom}"
        );

        for i in 0..d {
            for j in 0..d {
                state.a_inv[i * d + j] -= a_inv_x[i] * a_inv_x[j] / denom;
            }
        }
        for i in 0..d {
            state.b[i] += reward * x[i];
        }
        state.updates += 1;
        self.total_updates += 1;
    }

    /// Per-arm update counts and model coefficients.
    pub fn summary(&self) -> Vec<ArmSummary> {
        Arm::ALL
            .iter()
            .map(|&arm| {
                let state = &self.arms[arm.index()];
                ArmSummary {
                    arm,
                    updates: state.updates,
                    theta: state.theta(self.config.dimension),
                }
            })
            .collect()
    }

    /// Export learner state for persistence.
    pub fn export_state(&self) -> BanditState {
        BanditState {
            config: self.config,
            arms: self.arms.clone(),
            total_updates: self.total_updates,
        }
    }

    /// Restore a learner from persisted state, validating shapes.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] when the stored arm count or matrix/vector
    /// sizes do not line up with the stored dimension.
    pub fn import_state(state: BanditState) -> Result<Self, StateError> {
        let d = state.config.dimension;
        if state.arms.len() != Arm::ALL.len() {
            return Err(StateError::ArmCountMismatch {
                stored: state.arms.len(),
                expected: Arm::ALL.len(),
            });
        }
        for arm_state in &state.arms {
            if arm_state.a_inv.len() != d * d {
                return Err(StateError::Corrupt(format!(
                    "Ainv has {} entries, expected {}",
                    arm_state.a_inv.len(),
                    d * d
                )));
            }
            if arm_state.b.len() != d {
                return Err(StateError::Corrupt(format!(
                    "b has {} entries, expected {}",
                    arm_state.b.len(),
                    d
                )));
            }
        }
        Ok(Self {
            config: state.config,
            arms: state.arms,
            total_updates: state.total_updates,
        })
    }

    fn check_dimension(&self, context: &FeatureVector) -> usize {
        let d = self.config.dimension;
        assert_eq!(
            context.dim(),
            d,
            "context dimension {} does not match bandit dimension {}",
            context.dim(),
            d
        );
        d
    }
}

impl Default for LinUcbBandit {
    fn default() -> Self {
        Self::new()
    }
}

fn identity(d: usize) -> Vec<f64> {
    let mut m = vec![0.0; d * d];
    for i in 0..d {
        m[i * d + i] = 1.0;
    }
    m
}

fn mat_vec(m: &[f64], v: &[f64], d: usize) -> Vec<f64> {
    (0..d)
        .map(|i| (0..d).map(|j| m[i * d + j] * v[j]).sum())
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
