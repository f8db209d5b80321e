//! Sleep habit metrics derived from episode history.
//!
//! Bed/wake hours are clock times, which wrap at midnight, so all the
//! averaging here is circular: hours map onto the unit circle and the mean
//! comes back through atan2. A naive average of 23:30 and 00:30 would land
//! at noon; the circular mean lands at midnight.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::debt::DebtTrend;
use crate::episode::{valid_episodes, EpisodeKind, SleepEpisode};
use crate::profile::UserProfile;

/// Aggregated bed/wake habits over a history of main sleep bouts.
///
/// Naps are excluded throughout. Without any main sleep in the history the
/// profile's configured hours are used, the shift and variability are zero,
/// and regularity reports 100 (no evidence of irregularity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepHabits {
    /// Rounded circular mean bed hour (0-23).
    pub usual_bed_hour: u32,
    /// Rounded circular mean wake hour (0-23).
    pub usual_wake_hour: u32,
    /// Weekend minus weekday mean bed hour, in minutes, wrapped to
    /// [-720, 720). Positive means later weekend bedtimes.
    pub weekend_shift_minutes: f64,
    /// Mean absolute deviation of bedtimes from their mean, in minutes.
    pub bedtime_variability_minutes: f64,
    /// 0-100 consistency score from consecutive bedtime differences.
    pub regularity_index: f64,
    /// Mean duration of main sleep bouts, in hours.
    pub average_sleep_hours: f64,
    /// Number of main sleep bouts the metrics are based on.
    pub nights: usize,
}

impl SleepHabits {
    pub fn from_episodes(
        episodes: &[SleepEpisode],
        tz: FixedOffset,
        profile: &UserProfile,
    ) -> Self {
        let mut bouts: Vec<&SleepEpisode> = valid_episodes(episodes)
            .filter(|e| e.kind(profile.short_sleep_threshold_min) == EpisodeKind::Sleep)
            .collect();
        bouts.sort_by_key(|e| e.start);

        if bouts.is_empty() {
            return Self {
                usual_bed_hour: profile.usual_bed_hour,
                usual_wake_hour: profile.usual_wake_hour,
                weekend_shift_minutes: 0.0,
                bedtime_variability_minutes: 0.0,
                regularity_index: 100.0,
                average_sleep_hours: 0.0,
                nights: 0,
            };
        }

        let bed_hours: Vec<f64> = bouts.iter().map(|e| clock_hour(e.start, tz)).collect();
        let wake_hours: Vec<f64> = bouts.iter().map(|e| clock_hour(e.end, tz)).collect();
        let mean_bed = circular_mean_hour(&bed_hours);
        let mean_wake = circular_mean_hour(&wake_hours);

        let mut weekend = Vec::new();
        let mut weekday = Vec::new();
        for e in &bouts {
            let hour = clock_hour(e.start, tz);
            if is_weekend(e, tz) {
                weekend.push(hour);
            } else {
                weekday.push(hour);
            }
        }
        let weekend_shift_minutes = if weekend.is_empty() || weekday.is_empty() {
            0.0
        } else {
            wrap_hour_diff(circular_mean_hour(&weekend), circular_mean_hour(&weekday)) * 60.0
        };

        let bedtime_variability_minutes = bed_hours
            .iter()
            .map(|&h| wrap_hour_diff(h, mean_bed).abs())
            .sum::<f64>()
            / bed_hours.len() as f64
            * 60.0;

        let regularity_index = regularity_index(&bed_hours);

        let average_sleep_hours =
            bouts.iter().map(|e| e.duration_hours()).sum::<f64>() / bouts.len() as f64;

        Self {
            usual_bed_hour: round_hour(mean_bed),
            usual_wake_hour: round_hour(mean_wake),
            weekend_shift_minutes,
            bedtime_variability_minutes,
            regularity_index,
            average_sleep_hours,
            nights: bouts.len(),
        }
    }
}

/// Duration-and-quality score in [0, 100]:
/// `min(duration/ideal, 1) * 100 * quality/5` with quality clamped to 1-5.
pub fn sleep_score(duration_hours: f64, ideal_hours: f64, quality: u8) -> f64 {
    if ideal_hours <= 0.0 {
        return 0.0;
    }
    let duration_factor = (duration_hours / ideal_hours).clamp(0.0, 1.0);
    duration_factor * 100.0 * f64::from(quality.clamp(1, 5)) / 5.0
}

/// One threshold-triggered advice entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Stable identifier; the trigger condition is the contract.
    pub id: &'static str,
    pub priority: u8,
    pub message: String,
}

/// Threshold-triggered advice, highest priority first.
pub fn advice(habits: &SleepHabits, trend: DebtTrend) -> Vec<Advice> {
    let mut entries = Vec::new();

    if habits.bedtime_variability_minutes > 120.0 {
        entries.push(Advice {
            id: "high-bedtime-variability",
            priority: 9,
            message: format!(
                "Bedtimes vary by {:.0} minutes on average; a steadier bedtime would help most",
                habits.bedtime_variability_minutes
            ),
        });
    }
    if habits.nights > 0 && habits.average_sleep_hours < 6.0 {
        entries.push(Advice {
            id: "short-average-sleep",
            priority: 8,
            message: format!(
                "Averaging {:.1}h of sleep; aim to extend nights toward the ideal",
                habits.average_sleep_hours
            ),
        });
    }
    if habits.regularity_index < 70.0 {
        entries.push(Advice {
            id: "low-regularity",
            priority: 8,
            message: format!(
                "Regularity at {:.0}/100; consistent bed and wake hours rebuild it",
                habits.regularity_index
            ),
        });
    }
    if trend == DebtTrend::Worsening {
        entries.push(Advice {
            id: "worsening-debt",
            priority: 6,
            message: "Debt has been rising over the recent days; plan an earlier night".to_string(),
        });
    }

    entries.sort_by(|a, b| b.priority.cmp(&a.priority));
    entries
}

/// 0-100 score from mean consecutive bedtime difference: identical
/// bedtimes score 100, a mean swing of a full day would score 0.
fn regularity_index(bed_hours: &[f64]) -> f64 {
    if bed_hours.len() < 2 {
        return 100.0;
    }
    let mean_diff = bed_hours
        .windows(2)
        .map(|pair| wrap_hour_diff(pair[1], pair[0]).abs())
        .sum::<f64>()
        / (bed_hours.len() - 1) as f64;
    (100.0 - mean_diff * 100.0 / 24.0).clamp(0.0, 100.0)
}

fn clock_hour(t: DateTime<Utc>, tz: FixedOffset) -> f64 {
    let local = t.with_timezone(&tz);
    f64::from(local.hour())
        + f64::from(local.minute()) / 60.0
        + f64::from(local.second()) / 3600.0
}

fn is_weekend(e: &SleepEpisode, tz: FixedOffset) -> bool {
    matches!(
        e.start_date_local(tz).weekday(),
        Weekday::Sat | Weekday::Sun
    )
}

fn circular_mean_hour(hours: &[f64]) -> f64 {
    let tau = std::f64::consts::TAU;
    let (sin_sum, cos_sum) = hours.iter().fold((0.0, 0.0), |(s, c), &h| {
        let angle = h / 24.0 * tau;
        (s + angle.sin(), c + angle.cos())
    });
    let mean = sin_sum.atan2(cos_sum) / tau * 24.0;
    if mean < 0.0 {
        mean + 24.0
    } else {
        mean
    }
}

/// Signed clock difference `a - b` wrapped into [-12, 12) hours.
fn wrap_hour_diff(a: f64, b: f64) -> f64 {
    let mut diff = (a - b) % 24.0;
    if diff >= 12.0 {
        diff -= 24.0;
    } else if diff < -12.0 {
        diff += 24.0;
    }
    diff
}

fn round_hour(hour: f64) -> u32 {
    (hour.round() as u32) % 24
}
