//! Closed-loop sleeper simulation.
//!
//! Runs a synthetic sleeper against the full coaching pipeline night by
//! night: generate a night of sleep for the archetype, wake up, ask the
//! coach for a suggestion, maybe follow it (which shapes the next night),
//! and feed the observed debt change back into the bandit.
//!
//! With a fixed seed every run is bit-for-bit reproducible, which makes
//! the simulator usable for regression tests as well as for eyeballing
//! how the coach behaves over weeks of each sleeper type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, Offset, TimeZone, Utc, Weekday};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coach::{debt_improvement_reward, Arm, FeatureVector, SleepCoach, SuggestionKind};
use crate::episode::SleepEpisode;
use crate::error::ValidationError;
use crate::profile::{Chronotype, UserProfile};

/// Synthetic sleeper type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleeperArchetype {
    /// Consistent bedtime, near-ideal duration.
    Steady,
    /// Late bedtime, short nights, strong weekend drift.
    NightOwl,
    /// Rotates between night sleep and day sleep every few days.
    ShiftWorker,
    /// Frequently broken nights.
    Fragmented,
}

impl SleeperArchetype {
    pub const ALL: [SleeperArchetype; 4] = [
        SleeperArchetype::Steady,
        SleeperArchetype::NightOwl,
        SleeperArchetype::ShiftWorker,
        SleeperArchetype::Fragmented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleeperArchetype::Steady => "steady",
            SleeperArchetype::NightOwl => "night-owl",
            SleeperArchetype::ShiftWorker => "shift-worker",
            SleeperArchetype::Fragmented => "fragmented",
        }
    }

    /// Profile a real user of this type would plausibly configure.
    pub fn profile(&self) -> UserProfile {
        match self {
            SleeperArchetype::Steady => UserProfile::default(),
            SleeperArchetype::NightOwl => UserProfile {
                chronotype: Chronotype::Evening,
                usual_bed_hour: 1,
                usual_wake_hour: 9,
                ..Default::default()
            },
            SleeperArchetype::ShiftWorker => UserProfile {
                usual_bed_hour: 23,
                usual_wake_hour: 7,
                ..Default::default()
            },
            SleeperArchetype::Fragmented => UserProfile::default(),
        }
    }

    fn parameters(&self) -> SleeperParameters {
        match self {
            SleeperArchetype::Steady => SleeperParameters {
                bed_offset_hours: 23.0,
                bed_jitter_hours: 0.25,
                duration_mean_hours: 7.8,
                duration_jitter_hours: 0.4,
                weekend_delay_hours: 0.25,
                fragmentation_probability: 0.02,
                rotated_bed_offset_hours: None,
            },
            SleeperArchetype::NightOwl => SleeperParameters {
                bed_offset_hours: 25.5,
                bed_jitter_hours: 0.75,
                duration_mean_hours: 6.6,
                duration_jitter_hours: 0.8,
                weekend_delay_hours: 2.0,
                fragmentation_probability: 0.05,
                rotated_bed_offset_hours: None,
            },
            SleeperArchetype::ShiftWorker => SleeperParameters {
                bed_offset_hours: 23.0,
                bed_jitter_hours: 0.5,
                duration_mean_hours: 6.8,
                duration_jitter_hours: 0.6,
                weekend_delay_hours: 0.0,
                fragmentation_probability: 0.1,
                rotated_bed_offset_hours: Some(9.0),
            },
            SleeperArchetype::Fragmented => SleeperParameters {
                bed_offset_hours: 23.5,
                bed_jitter_hours: 0.5,
                duration_mean_hours: 7.2,
                duration_jitter_hours: 0.5,
                weekend_delay_hours: 0.5,
                fragmentation_probability: 0.35,
                rotated_bed_offset_hours: None,
            },
        }
    }
}

impl fmt::Display for SleeperArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SleeperArchetype {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SleeperArchetype::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "archetype".to_string(),
                message: format!("unknown sleeper archetype '{s}'"),
            })
    }
}

/// Night-generation parameters for one archetype.
///
/// `bed_offset_hours` is measured from the night's calendar day at
/// midnight, so values past 24 mean falling asleep after the date line.
#[derive(Debug, Clone, Copy)]
struct SleeperParameters {
    bed_offset_hours: f64,
    bed_jitter_hours: f64,
    duration_mean_hours: f64,
    duration_jitter_hours: f64,
    weekend_delay_hours: f64,
    fragmentation_probability: f64,
    /// Day-sleep bed offset during rotated blocks, if the archetype rotates.
    rotated_bed_offset_hours: Option<f64>,
}

/// Simulation tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Sleeper type to simulate.
    pub archetype: SleeperArchetype,

    /// Number of nights to run.
    pub nights: u32,

    /// Random seed for reproducibility (None = random).
    pub seed: Option<u64>,

    /// Free time reported to the coach each morning, in hours.
    pub free_time_hours: f64,

    /// Probability the sleeper follows a given suggestion.
    pub adherence: f64,

    /// Rotation block length in days for the shift-worker archetype.
    pub rotation_days: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            archetype: SleeperArchetype::Steady,
            nights: 28,
            seed: None,
            free_time_hours: 1.0,
            adherence: 0.7,
            rotation_days: 3,
        }
    }
}

/// Aggregated outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub archetype: SleeperArchetype,
    pub nights: u32,
    /// Acute debt on the final morning, in hours.
    pub final_acute_debt_hours: f64,
    /// Mean of the per-day debt series over the whole run, in hours.
    pub mean_daily_debt_hours: f64,
    /// Sum of all rewards fed back to the bandit.
    pub total_reward: f64,
    /// Times each bandit arm was selected.
    pub arm_pulls: BTreeMap<String, usize>,
    /// Times each suggestion kind was issued.
    pub suggestion_counts: BTreeMap<String, usize>,
    /// Bandit updates performed (one behind the suggestion count).
    pub bandit_updates: usize,
    /// Episodes generated, naps and fragments included.
    pub episode_count: usize,
}

/// How a followed suggestion shapes the next night.
#[derive(Debug, Clone, Copy, Default)]
struct NightAdjustment {
    bed_shift_hours: f64,
    extra_sleep_hours: f64,
    /// Suppress bedtime jitter (rhythm correction).
    steady_bedtime: bool,
    nap_minutes: Option<i64>,
}

impl NightAdjustment {
    fn for_suggestion(kind: &SuggestionKind) -> Self {
        match kind {
            SuggestionKind::EarlierBedtime { .. } => Self {
                bed_shift_hours: -1.0,
                extra_sleep_hours: 0.5,
                ..Self::default()
            },
            SuggestionKind::ShortNap { minutes } => Self {
                nap_minutes: Some(*minutes),
                ..Self::default()
            },
            SuggestionKind::RhythmCorrection { .. } => Self {
                steady_bedtime: true,
                ..Self::default()
            },
            SuggestionKind::PreemptiveRest { .. } => Self {
                bed_shift_hours: -0.5,
                extra_sleep_hours: 0.75,
                ..Self::default()
            },
            SuggestionKind::KeepItUp => Self::default(),
        }
    }
}

/// Feedback waiting for the next morning's debt reading.
struct PendingFeedback {
    arm: Arm,
    context: FeatureVector,
    acute_hours: f64,
}

/// Night-by-night simulation harness.
pub struct SleepSimulator {
    config: SimConfig,
}

impl SleepSimulator {
    pub fn new(archetype: SleeperArchetype) -> Self {
        Self::with_config(SimConfig {
            archetype,
            ..Default::default()
        })
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the configured number of nights and aggregate the outcome.
    pub fn run(&self) -> SimReport {
        let mut rng = match self.config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };

        let tz = Utc.fix();
        let profile = self.config.archetype.profile();
        let mut coach = SleepCoach::new(profile, tz);
        let params = self.config.archetype.parameters();

        // Jan 5 2026 is a Monday; weekday/weekend patterns line up with
        // real calendar weeks.
        let start = Utc
            .with_ymd_and_hms(2026, 1, 5, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let mut history: Vec<SleepEpisode> = Vec::new();
        let mut pending: Option<PendingFeedback> = None;
        let mut adjustment = NightAdjustment::default();
        let mut total_reward = 0.0;
        let mut arm_pulls: BTreeMap<String, usize> = BTreeMap::new();
        let mut suggestion_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut last_morning = start;

        for day in 0..self.config.nights {
            self.generate_night(day, start, &params, adjustment, &mut rng, &mut history);
            adjustment = NightAdjustment::default();

            let morning = start + Days::new(u64::from(day) + 1) + Duration::hours(9);
            last_morning = morning;
            let acute = coach.debt_engine().acute_debt(morning, &history);

            if let Some(feedback) = pending.take() {
                let reward = debt_improvement_reward(feedback.acute_hours, acute);
                coach.observe_reward(feedback.arm, reward, &feedback.context);
                total_reward += reward;
            }

            let suggestion = coach.suggest(morning, &history, self.config.free_time_hours);
            *arm_pulls
                .entry(suggestion.arm.as_str().to_string())
                .or_default() += 1;
            *suggestion_counts
                .entry(suggestion.kind.label().to_string())
                .or_default() += 1;

            if rng.gen::<f64>() < self.config.adherence {
                adjustment = NightAdjustment::for_suggestion(&suggestion.kind);
            }

            pending = Some(PendingFeedback {
                arm: suggestion.arm,
                context: suggestion.context,
                acute_hours: acute,
            });
        }

        let final_acute = coach.debt_engine().acute_debt(last_morning, &history);
        let series = coach
            .debt_engine()
            .daily_series(last_morning, self.config.nights.max(1), &history);
        let mean_daily = if series.is_empty() {
            0.0
        } else {
            series.iter().map(|d| d.debt_hours).sum::<f64>() / series.len() as f64
        };

        SimReport {
            archetype: self.config.archetype,
            nights: self.config.nights,
            final_acute_debt_hours: final_acute,
            mean_daily_debt_hours: mean_daily,
            total_reward,
            arm_pulls,
            suggestion_counts,
            bandit_updates: coach.bandit().total_updates(),
            episode_count: history.len(),
        }
    }

    /// Generate the episodes for one night (plus any adhered nap that
    /// afternoon) and append them to the history.
    fn generate_night(
        &self,
        day: u32,
        start: DateTime<Utc>,
        params: &SleeperParameters,
        adjustment: NightAdjustment,
        rng: &mut Mcg128Xsl64,
        history: &mut Vec<SleepEpisode>,
    ) {
        let date = start + Days::new(u64::from(day));

        if let Some(minutes) = adjustment.nap_minutes {
            let nap_start = date + Duration::hours(14) + Duration::minutes(30);
            push_episode(history, nap_start, minutes as f64 / 60.0);
        }

        let rotated = params
            .rotated_bed_offset_hours
            .filter(|_| self.in_rotated_block(day));
        let base_offset = rotated.unwrap_or(params.bed_offset_hours);

        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let weekend_delay = if weekend && rotated.is_none() {
            params.weekend_delay_hours
        } else {
            0.0
        };
        let jitter = if adjustment.steady_bedtime {
            0.0
        } else {
            rng.gen::<f64>() * params.bed_jitter_hours * 2.0 - params.bed_jitter_hours
        };

        let bed_offset = base_offset + weekend_delay + jitter + adjustment.bed_shift_hours;
        let bed = date + Duration::seconds((bed_offset * 3600.0) as i64);

        let duration_jitter = rng.gen::<f64>() * params.duration_jitter_hours * 2.0
            - params.duration_jitter_hours;
        let duration =
            (params.duration_mean_hours + duration_jitter + adjustment.extra_sleep_hours)
                .max(0.5);

        if rng.gen::<f64>() < params.fragmentation_probability {
            // Broken night: two bouts separated by a 30-60 minute wake gap
            let first = duration * 0.6;
            let second = duration - first;
            let gap = 0.5 + rng.gen::<f64>() * 0.5;
            push_episode(history, bed, first);
            push_episode(
                history,
                bed + Duration::seconds(((first + gap) * 3600.0) as i64),
                second,
            );
        } else {
            push_episode(history, bed, duration);
        }
    }

    fn in_rotated_block(&self, day: u32) -> bool {
        let period = self.config.rotation_days.max(1);
        (day / period) % 2 == 1
    }
}

fn push_episode(history: &mut Vec<SleepEpisode>, start: DateTime<Utc>, hours: f64) {
    let end = start + Duration::seconds((hours * 3600.0) as i64);
    history.push(SleepEpisode {
        id: Uuid::new_v4(),
        start,
        end,
    });
}
