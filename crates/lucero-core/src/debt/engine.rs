//! Sleep debt computation.
//!
//! Three views of debt, all in fractional hours and never negative:
//!
//! - **daily**: ideal minus actual for one day, clamped at zero
//! - **acute**: the trailing-24h window ending now, with episode durations
//!   discounted by the recovery weight table
//! - **total**: per-day anchored windows over the last N days, unweighted
//!   durations, summed
//!
//! A weekly figure applies a capped nap credit on top of the total. With a
//! completely empty (or all-invalid) history every operation reports zero
//! debt; once any episode exists, days without sleep contribute their full
//! ideal as debt.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::anchor::{AnchorConfig, AnchorResolver};
use super::weight::RecoveryWeights;
use super::DebtWindow;
use crate::episode::{valid_episodes, SleepEpisode};

/// Tunables for debt computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtConfig {
    /// Accounting window length in hours.
    pub window_hours: i64,

    /// Maximum nap credit against the weekly figure, in seconds.
    pub nap_credit_cap_seconds: f64,

    /// Half-to-half change (hours) under which a trend counts as stable.
    pub trend_margin_hours: f64,

    /// Recovery weight table.
    pub weights: RecoveryWeights,

    /// Anchor resolution tunables.
    pub anchor: AnchorConfig,
}

impl Default for DebtConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            nap_credit_cap_seconds: 1800.0,
            trend_margin_hours: 0.25,
            weights: RecoveryWeights::default(),
            anchor: AnchorConfig::default(),
        }
    }
}

/// One day's row in a debt series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDebt {
    pub day: NaiveDate,
    /// Unweighted hours slept inside the day's anchored window.
    pub slept_hours: f64,
    pub debt_hours: f64,
}

/// Direction of debt over a series window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtTrend {
    Improving,
    Stable,
    Worsening,
}

impl fmt::Display for DebtTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtTrend::Improving => write!(f, "improving"),
            DebtTrend::Stable => write!(f, "stable"),
            DebtTrend::Worsening => write!(f, "worsening"),
        }
    }
}

/// Display band for a debt figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtSeverity {
    Low,
    Elevated,
    High,
}

impl fmt::Display for DebtSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtSeverity::Low => write!(f, "low"),
            DebtSeverity::Elevated => write!(f, "elevated"),
            DebtSeverity::High => write!(f, "high"),
        }
    }
}

/// Contribution of one recovery-weight tier to an acute window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierContribution {
    pub label: String,
    pub weight: f64,
    pub episode_count: usize,
    pub raw_hours: f64,
    pub weighted_hours: f64,
}

/// Per-tier explanation of an acute debt figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtBreakdown {
    pub ideal_hours: f64,
    pub effective_hours: f64,
    pub debt_hours: f64,
    pub tiers: Vec<TierContribution>,
}

/// Computes sleep debt from episode history.
///
/// Construct one per user with the profile's ideal hours and local offset;
/// `now` is always passed in explicitly so computations are reproducible.
#[derive(Debug, Clone)]
pub struct DebtEngine {
    config: DebtConfig,
    ideal_hours: f64,
    tz: FixedOffset,
    resolver: AnchorResolver,
}

impl DebtEngine {
    /// Engine with default tunables.
    pub fn new(ideal_hours: f64, tz: FixedOffset) -> Self {
        Self::with_config(DebtConfig::default(), ideal_hours, tz)
    }

    pub fn with_config(config: DebtConfig, ideal_hours: f64, tz: FixedOffset) -> Self {
        let resolver = AnchorResolver::with_config(config.anchor, tz);
        Self {
            config,
            ideal_hours,
            tz,
            resolver,
        }
    }

    pub fn config(&self) -> &DebtConfig {
        &self.config
    }

    pub fn ideal_hours(&self) -> f64 {
        self.ideal_hours
    }

    // ── Queries ──────────────────────────────────────────────

    /// Hours of debt for one day: ideal minus actual, never negative.
    pub fn daily_debt(ideal_hours: f64, actual_slept_hours: f64) -> f64 {
        (ideal_hours - actual_slept_hours).max(0.0)
    }

    /// Debt over the trailing window ending at `now`, with recovery-weighted
    /// durations. Zero when the history holds no valid episode at all.
    pub fn acute_debt(&self, now: DateTime<Utc>, episodes: &[SleepEpisode]) -> f64 {
        if !has_tracked_data(episodes) {
            return 0.0;
        }
        let effective = self.effective_hours(now, episodes);
        Self::daily_debt(self.ideal_hours, effective)
    }

    /// Recovery-weighted hours inside the trailing window ending at `now`.
    pub fn effective_hours(&self, now: DateTime<Utc>, episodes: &[SleepEpisode]) -> f64 {
        let window_start = now - Duration::hours(self.config.window_hours);
        valid_episodes(episodes)
            .filter(|e| e.overlaps(window_start, now))
            .map(|e| {
                let minutes = e.duration_minutes();
                self.config.weights.weight(minutes) * minutes as f64 / 60.0
            })
            .sum()
    }

    /// Per-tier explanation of the acute figure at `now`.
    pub fn acute_breakdown(&self, now: DateTime<Utc>, episodes: &[SleepEpisode]) -> DebtBreakdown {
        let window_start = now - Duration::hours(self.config.window_hours);
        let weights = &self.config.weights;
        let mut tiers: Vec<TierContribution> = (0..weights.tier_count())
            .map(|t| TierContribution {
                label: weights.tier_label(t),
                weight: weights.weights[t],
                episode_count: 0,
                raw_hours: 0.0,
                weighted_hours: 0.0,
            })
            .collect();

        for e in valid_episodes(episodes).filter(|e| e.overlaps(window_start, now)) {
            let minutes = e.duration_minutes();
            let tier = &mut tiers[weights.tier(minutes)];
            tier.episode_count += 1;
            tier.raw_hours += minutes as f64 / 60.0;
            tier.weighted_hours += weights.weight(minutes) * minutes as f64 / 60.0;
        }

        let effective: f64 = tiers.iter().map(|t| t.weighted_hours).sum();
        DebtBreakdown {
            ideal_hours: self.ideal_hours,
            effective_hours: effective,
            debt_hours: self.acute_debt(now, episodes),
            tiers,
        }
    }

    /// Anchored accounting window for a calendar day.
    pub fn window_for(&self, day: NaiveDate, episodes: &[SleepEpisode]) -> DebtWindow {
        let anchor = self.resolver.resolve(day, episodes);
        DebtWindow::starting_at(anchor, Duration::hours(self.config.window_hours))
    }

    /// Per-day debt rows for the last `days` days, oldest first.
    ///
    /// Days without sleep get a zero-slept row; with an entirely empty
    /// history every row reports zero debt as well.
    pub fn daily_series(
        &self,
        now: DateTime<Utc>,
        days: u32,
        episodes: &[SleepEpisode],
    ) -> Vec<DailyDebt> {
        let tracked = has_tracked_data(episodes);
        let today = now.with_timezone(&self.tz).date_naive();
        (0..days)
            .rev()
            .map(|back| {
                let day = today - Days::new(u64::from(back));
                let window = self.window_for(day, episodes);
                let slept = self.unweighted_hours(&window, episodes);
                let debt = if tracked {
                    Self::daily_debt(self.ideal_hours, slept)
                } else {
                    0.0
                };
                DailyDebt {
                    day,
                    slept_hours: slept,
                    debt_hours: debt,
                }
            })
            .collect()
    }

    /// Aggregate debt over the last `days` anchored windows.
    pub fn total_debt(&self, now: DateTime<Utc>, days: u32, episodes: &[SleepEpisode]) -> f64 {
        self.daily_series(now, days, episodes)
            .iter()
            .map(|d| d.debt_hours)
            .sum()
    }

    /// Aggregate debt minus a nap credit capped at
    /// `nap_credit_cap_seconds`. Longer naps never earn more credit.
    pub fn weekly_debt_with_nap_credit(
        &self,
        now: DateTime<Utc>,
        days: u32,
        nap_duration_seconds: f64,
        episodes: &[SleepEpisode],
    ) -> f64 {
        let total = self.total_debt(now, days, episodes);
        let credit =
            nap_duration_seconds.clamp(0.0, self.config.nap_credit_cap_seconds) / 3600.0;
        (total - credit).max(0.0)
    }

    /// Trend over the last `days` daily rows: first half vs second half,
    /// with `trend_margin_hours` of slack counting as stable.
    pub fn trend(&self, now: DateTime<Utc>, days: u32, episodes: &[SleepEpisode]) -> DebtTrend {
        let series = self.daily_series(now, days, episodes);
        if series.len() < 2 {
            return DebtTrend::Stable;
        }
        let mid = series.len() / 2;
        let first = avg(series[..mid].iter().map(|d| d.debt_hours));
        let second = avg(series[mid..].iter().map(|d| d.debt_hours));
        let delta = second - first;
        if delta > self.config.trend_margin_hours {
            DebtTrend::Worsening
        } else if delta < -self.config.trend_margin_hours {
            DebtTrend::Improving
        } else {
            DebtTrend::Stable
        }
    }

    /// Display band for a debt figure in hours.
    pub fn severity(debt_hours: f64) -> DebtSeverity {
        if debt_hours < 4.0 {
            DebtSeverity::Low
        } else if debt_hours < 8.0 {
            DebtSeverity::Elevated
        } else {
            DebtSeverity::High
        }
    }

    fn unweighted_hours(&self, window: &DebtWindow, episodes: &[SleepEpisode]) -> f64 {
        valid_episodes(episodes)
            .filter(|e| window.overlapped_by(e))
            .map(|e| e.duration_hours())
            .sum()
    }
}

fn has_tracked_data(episodes: &[SleepEpisode]) -> bool {
    valid_episodes(episodes).next().is_some()
}

fn avg(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
