//! Deterministic recommendation rule table.
//!
//! Rules run in a fixed severity-first order and the first match wins; no
//! scoring or blending. The order is part of the contract so that the same
//! context always yields the same suggestion:
//!
//! 1. large debt: move bedtime an hour earlier
//! 2. moderate debt with free time: short nap
//! 3. weekend rhythm drift: anchor the wake hour
//! 4. forecast breach inside the lookahead: pre-emptive rest
//! 5. otherwise: keep it up
//!
//! The bandit-chosen arm does not branch the table; it rides along on the
//! assembled [`Suggestion`] as the learned action category the caller
//! attributes feedback to.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::bandit::Arm;
use super::context::{DebtForecast, FeatureVector, SuggestionContext};

/// Rule thresholds and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Debt (minutes) at which the bedtime-advance rule fires.
    pub large_debt_minutes: f64,

    /// Debt (minutes) at which the nap rule becomes eligible.
    pub moderate_debt_minutes: f64,

    /// Free time (minutes) required for the nap rule.
    pub nap_free_minutes: f64,

    /// Nap length (minutes) the nap rule recommends.
    pub nap_length_minutes: i64,

    /// Weekend-vs-weekday bed-hour drift (minutes) for the rhythm rule.
    pub weekend_shift_minutes: f64,

    /// Forecast debt (minutes) that triggers pre-emptive rest.
    pub forecast_debt_minutes: f64,

    /// How many days ahead the forecast rule looks.
    pub lookahead_days: u32,

    /// Bedtime shift (hours) assumed to repay large debt.
    pub repayment_hours: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            large_debt_minutes: 120.0,
            moderate_debt_minutes: 30.0,
            nap_free_minutes: 20.0,
            nap_length_minutes: 20,
            weekend_shift_minutes: 120.0,
            forecast_debt_minutes: 180.0,
            lookahead_days: 2,
            repayment_hours: 1,
        }
    }
}

/// Concrete recommendation with its derived parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SuggestionKind {
    /// Large debt: go to bed around `target_bed_hour` to start repaying.
    EarlierBedtime { debt_hours: f64, target_bed_hour: u32 },
    /// Moderate debt and a free slot: nap for `minutes`.
    ShortNap { minutes: i64 },
    /// Weekend drift: hold the usual wake hour to re-anchor the rhythm.
    RhythmCorrection {
        usual_wake_hour: u32,
        shift_minutes: f64,
    },
    /// Forecast breach on `day`: bank sleep beforehand.
    PreemptiveRest {
        day: NaiveDate,
        forecast_debt_minutes: f64,
    },
    /// Nothing urgent: keep the current routine.
    KeepItUp,
}

impl SuggestionKind {
    /// Stable identifier for counting and display.
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionKind::EarlierBedtime { .. } => "earlier_bedtime",
            SuggestionKind::ShortNap { .. } => "short_nap",
            SuggestionKind::RhythmCorrection { .. } => "rhythm_correction",
            SuggestionKind::PreemptiveRest { .. } => "preemptive_rest",
            SuggestionKind::KeepItUp => "keep_it_up",
        }
    }

    /// Short human-readable explanation of the recommendation.
    pub fn rationale(&self) -> String {
        match self {
            SuggestionKind::EarlierBedtime {
                debt_hours,
                target_bed_hour,
            } => format!(
                "Debt at {debt_hours:.1}h; moving bedtime to around {target_bed_hour}:00 repays about an hour per night"
            ),
            SuggestionKind::ShortNap { minutes } => {
                format!("A {minutes}-minute nap now takes the edge off without harming tonight's sleep")
            }
            SuggestionKind::RhythmCorrection {
                usual_wake_hour,
                shift_minutes,
            } => format!(
                "Weekend bedtime drifted {:.0} minutes; waking at {usual_wake_hour}:00 either day re-anchors the rhythm",
                shift_minutes
            ),
            SuggestionKind::PreemptiveRest {
                day,
                forecast_debt_minutes,
            } => format!(
                "Forecast shows {:.0} minutes of debt by {day}; banking sleep now softens it",
                forecast_debt_minutes
            ),
            SuggestionKind::KeepItUp => "Sleep is on track; keep the current routine".to_string(),
        }
    }
}

/// Final coaching output: the rule-derived recommendation plus the
/// bandit's chosen arm and the exact context vector that justified it.
/// The caller pairs `arm` and `context` again when reporting the reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub arm: Arm,
    pub context: FeatureVector,
    pub rationale: String,
}

/// Ordered rule table over a [`SuggestionContext`].
#[derive(Debug, Clone, Default)]
pub struct RecommendationPolicy {
    config: PolicyConfig,
}

impl RecommendationPolicy {
    pub fn new() -> Self {
        Self {
            config: PolicyConfig::default(),
        }
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate the rule table; first match wins.
    pub fn decide(&self, ctx: &SuggestionContext) -> SuggestionKind {
        let c = &self.config;

        if ctx.debt_minutes >= c.large_debt_minutes {
            return SuggestionKind::EarlierBedtime {
                debt_hours: ctx.debt_minutes / 60.0,
                target_bed_hour: (ctx.usual_bed_hour + 24 - (c.repayment_hours % 24)) % 24,
            };
        }

        if ctx.debt_minutes >= c.moderate_debt_minutes && ctx.free_minutes >= c.nap_free_minutes {
            return SuggestionKind::ShortNap {
                minutes: c.nap_length_minutes,
            };
        }

        if ctx.weekend_shift_minutes >= c.weekend_shift_minutes {
            return SuggestionKind::RhythmCorrection {
                usual_wake_hour: ctx.usual_wake_hour,
                shift_minutes: ctx.weekend_shift_minutes,
            };
        }

        if let Some(breach) = self.first_forecast_breach(ctx) {
            return SuggestionKind::PreemptiveRest {
                day: breach.day,
                forecast_debt_minutes: breach.debt_minutes,
            };
        }

        SuggestionKind::KeepItUp
    }

    /// Earliest future day inside the lookahead whose forecast debt meets
    /// the threshold.
    fn first_forecast_breach(&self, ctx: &SuggestionContext) -> Option<DebtForecast> {
        let horizon = ctx.today + Days::new(u64::from(self.config.lookahead_days));
        ctx.future_debt_minutes
            .iter()
            .filter(|f| {
                f.day > ctx.today
                    && f.day <= horizon
                    && f.debt_minutes >= self.config.forecast_debt_minutes
            })
            .min_by_key(|f| f.day)
            .copied()
    }
}
