//! User sleep profile.
//!
//! Holds the per-user targets and thresholds the engine reads: ideal sleep
//! duration, chronotype, usual bed/wake hours, and the episode
//! classification thresholds shared with the ingestion side. Serialized as
//! the `[profile]` section of the application config.

use serde::{Deserialize, Serialize};

/// Morningness/eveningness tendency.
///
/// The bandit consumes the normalized value, not the variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chronotype {
    Morning,
    Neutral,
    Evening,
}

impl Chronotype {
    /// Normalized feature value: morning 0.0, neutral 0.5, evening 1.0.
    pub fn normalized(self) -> f64 {
        match self {
            Chronotype::Morning => 0.0,
            Chronotype::Neutral => 0.5,
            Chronotype::Evening => 1.0,
        }
    }
}

/// Per-user sleep targets and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Ideal sleep per day, in seconds.
    #[serde(default = "default_ideal_sleep_seconds")]
    pub ideal_sleep_seconds: f64,

    /// Morningness/eveningness tendency.
    #[serde(default = "default_chronotype")]
    pub chronotype: Chronotype,

    /// Usual bedtime hour (0-23), used when history is too thin to derive one.
    #[serde(default = "default_usual_bed_hour")]
    pub usual_bed_hour: u32,

    /// Usual wake hour (0-23), used when history is too thin to derive one.
    #[serde(default = "default_usual_wake_hour")]
    pub usual_wake_hour: u32,

    /// Subjective quality (1-5) assumed when an episode carries no rating.
    #[serde(default = "default_sleep_quality")]
    pub default_sleep_quality: u8,

    /// Episodes shorter than this many minutes count as naps.
    #[serde(default = "default_short_sleep_threshold_min")]
    pub short_sleep_threshold_min: i64,

    /// Gap (minutes) under which the ingestion side stitches fragments.
    /// Stored here so both sides read one value; the engine itself never
    /// merges episodes.
    #[serde(default = "default_nap_gap_threshold_min")]
    pub nap_gap_threshold_min: i64,
}

impl UserProfile {
    /// Ideal sleep per day, in hours.
    pub fn ideal_hours(&self) -> f64 {
        self.ideal_sleep_seconds / 3600.0
    }
}

// Default functions
fn default_ideal_sleep_seconds() -> f64 {
    8.0 * 3600.0
}
fn default_chronotype() -> Chronotype {
    Chronotype::Neutral
}
fn default_usual_bed_hour() -> u32 {
    23
}
fn default_usual_wake_hour() -> u32 {
    7
}
fn default_sleep_quality() -> u8 {
    3
}
fn default_short_sleep_threshold_min() -> i64 {
    90
}
fn default_nap_gap_threshold_min() -> i64 {
    30
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            ideal_sleep_seconds: default_ideal_sleep_seconds(),
            chronotype: default_chronotype(),
            usual_bed_hour: default_usual_bed_hour(),
            usual_wake_hour: default_usual_wake_hour(),
            default_sleep_quality: default_sleep_quality(),
            short_sleep_threshold_min: default_short_sleep_threshold_min(),
            nap_gap_threshold_min: default_nap_gap_threshold_min(),
        }
    }
}
