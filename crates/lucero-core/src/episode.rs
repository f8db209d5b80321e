//! Sleep episode records.
//!
//! A [`SleepEpisode`] is an immutable fact produced by the ingestion side
//! (wearable sync, manual entry): a unique id plus start/end timestamps.
//! Duration is always derived from the timestamps, never stored.
//!
//! Episodes with `end <= start` can arrive from upstream (clock skew,
//! partial syncs). The engine never treats them as errors; they are
//! filtered out of every aggregation via [`valid_episodes`].

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A single recorded sleep bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepEpisode {
    /// Unique episode id, assigned by the ingestion side.
    pub id: Uuid,
    /// Episode start (UTC).
    pub start: DateTime<Utc>,
    /// Episode end (UTC). Must be after `start` to count.
    pub end: DateTime<Utc>,
}

/// Coarse classification of an episode by duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeKind {
    /// A main sleep bout.
    Sleep,
    /// A short bout under the nap threshold.
    Nap,
}

impl SleepEpisode {
    /// Create a validated episode with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeRange`] if `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            start,
            end,
        })
    }

    /// Whether the timestamps form a real interval.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration in whole minutes. Zero or negative for invalid episodes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Duration in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// Temporal midpoint of the episode.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) / 2
    }

    /// True if the episode overlaps the half-open interval `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Local calendar day the episode started on.
    pub fn start_date_local(&self, tz: FixedOffset) -> NaiveDate {
        self.start.with_timezone(&tz).date_naive()
    }

    /// Classify as nap or main sleep by the given threshold (minutes).
    pub fn kind(&self, short_sleep_threshold_min: i64) -> EpisodeKind {
        if self.duration_minutes() < short_sleep_threshold_min {
            EpisodeKind::Nap
        } else {
            EpisodeKind::Sleep
        }
    }
}

/// Iterate only the episodes with a real time interval.
///
/// Every aggregation in the engine goes through this filter so that one
/// malformed record never aborts a computation.
pub fn valid_episodes(episodes: &[SleepEpisode]) -> impl Iterator<Item = &SleepEpisode> {
    episodes.iter().filter(|e| e.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ep(start_h: u32, dur_min: i64) -> SleepEpisode {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, start_h, 0, 0).unwrap();
        SleepEpisode {
            id: Uuid::new_v4(),
            start,
            end: start + Duration::minutes(dur_min),
        }
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let end = start - Duration::hours(1);
        assert!(SleepEpisode::new(start, end).is_err());
        assert!(SleepEpisode::new(start, start).is_err());
    }

    #[test]
    fn test_duration_and_midpoint() {
        let e = ep(0, 480);
        assert_eq!(e.duration_minutes(), 480);
        assert!((e.duration_hours() - 8.0).abs() < 1e-9);
        assert_eq!(e.midpoint(), e.start + Duration::hours(4));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let e = ep(2, 60); // 02:00-03:00
        let w_start = Utc.with_ymd_and_hms(2026, 3, 10, 3, 0, 0).unwrap();
        let w_end = w_start + Duration::hours(1);
        // Touching boundaries do not overlap
        assert!(!e.overlaps(w_start, w_end));
        assert!(e.overlaps(w_start - Duration::minutes(30), w_end));
    }

    #[test]
    fn test_invalid_filtered() {
        let good = ep(1, 60);
        let mut bad = ep(4, 60);
        bad.end = bad.start;
        let all = vec![good.clone(), bad];
        let kept: Vec<_> = valid_episodes(&all).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, good.id);
    }

    #[test]
    fn test_nap_classification() {
        assert_eq!(ep(14, 40).kind(90), EpisodeKind::Nap);
        assert_eq!(ep(23, 420).kind(90), EpisodeKind::Sleep);
        assert_eq!(ep(14, 90).kind(90), EpisodeKind::Sleep);
    }

    #[test]
    fn test_local_start_date_crosses_midnight() {
        // 23:30 UTC on Mar 10 is Mar 11 in UTC+9
        let e = ep(23, 60);
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            e.start_date_local(jst),
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
        );
        assert_eq!(
            e.start_date_local(FixedOffset::east_opt(0).unwrap()),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }
}
