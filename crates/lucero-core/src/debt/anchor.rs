//! Anchor resolution for daily accounting windows.
//!
//! Each calendar day gets a 24-hour accounting window. The window start
//! ("anchor") defaults to local noon but shifts toward the user's observed
//! sleep pattern so that shift workers and night owls are not split across
//! two windows: the resolver takes the median midpoint of the longest
//! episode per recent day and clamps it to within ±6 hours of noon. The
//! median keeps one atypical night from dragging the anchor around.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::episode::{valid_episodes, SleepEpisode};

/// Tunables for anchor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Days of history consulted, counting the target day itself.
    pub lookback_days: u32,

    /// Maximum shift away from local noon, in hours.
    pub max_shift_hours: i64,

    /// Minimum distinct days of history required before the anchor moves
    /// off noon. 1 shifts on any data at all; raise it to demand a more
    /// established pattern before trusting the median.
    pub min_history_days: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            max_shift_hours: 6,
            min_history_days: 1,
        }
    }
}

/// Resolves the accounting-window anchor for a calendar day.
#[derive(Debug, Clone)]
pub struct AnchorResolver {
    config: AnchorConfig,
    tz: FixedOffset,
}

impl AnchorResolver {
    /// Resolver with default tunables for the given local offset.
    pub fn new(tz: FixedOffset) -> Self {
        Self {
            config: AnchorConfig::default(),
            tz,
        }
    }

    pub fn with_config(config: AnchorConfig, tz: FixedOffset) -> Self {
        Self { config, tz }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Anchor timestamp for `target_day`.
    ///
    /// Returns local noon when history is empty or thinner than
    /// `min_history_days` distinct days; otherwise the median episode
    /// midpoint clamped to `noon ± max_shift_hours`.
    pub fn resolve(&self, target_day: NaiveDate, history: &[SleepEpisode]) -> DateTime<Utc> {
        let noon = self.local_noon(target_day);
        let day_start = self.local_midnight(target_day);
        let from = day_start - Duration::days(self.config.lookback_days as i64 - 1);
        let until = day_start + Duration::days(1);

        // Longest episode per local day of start, in day order.
        let mut longest: BTreeMap<NaiveDate, &SleepEpisode> = BTreeMap::new();
        for episode in valid_episodes(history) {
            if episode.start < from || episode.start >= until {
                continue;
            }
            match longest.entry(episode.start_date_local(self.tz)) {
                Entry::Vacant(slot) => {
                    slot.insert(episode);
                }
                Entry::Occupied(mut slot) => {
                    if episode.duration() > slot.get().duration() {
                        slot.insert(episode);
                    }
                }
            }
        }

        if longest.len() < self.config.min_history_days.max(1) {
            return noon;
        }

        let mut midpoints: Vec<DateTime<Utc>> = longest.values().map(|e| e.midpoint()).collect();
        midpoints.sort();
        // Upper median for even counts.
        let median = midpoints[midpoints.len() / 2];

        let max_shift = Duration::hours(self.config.max_shift_hours);
        if median > noon + max_shift {
            noon + max_shift
        } else if median < noon - max_shift {
            noon - max_shift
        } else {
            median
        }
    }

    /// Local noon of a calendar day, as a UTC timestamp.
    pub fn local_noon(&self, day: NaiveDate) -> DateTime<Utc> {
        let naive = day
            .and_hms_opt(12, 0, 0)
            .unwrap_or_else(|| day.and_time(NaiveTime::default()));
        (naive - Duration::seconds(self.tz.local_minus_utc() as i64)).and_utc()
    }

    fn local_midnight(&self, day: NaiveDate) -> DateTime<Utc> {
        (day.and_time(NaiveTime::default())
            - Duration::seconds(self.tz.local_minus_utc() as i64))
        .and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn ep(y: i32, m: u32, d: u32, h: u32, dur_min: i64) -> SleepEpisode {
        let start = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        SleepEpisode {
            id: Uuid::new_v4(),
            start,
            end: start + Duration::minutes(dur_min),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_history_returns_noon() {
        let resolver = AnchorResolver::new(utc());
        let anchor = resolver.resolve(day(2026, 4, 10), &[]);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_noon_respects_offset() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let resolver = AnchorResolver::new(jst);
        let anchor = resolver.resolve(day(2026, 4, 10), &[]);
        // Noon in UTC+9 is 03:00 UTC
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_single_midpoint_within_band_returned_exactly() {
        let resolver = AnchorResolver::new(utc());
        // 13:00-15:00 on the target day, midpoint 14:00
        let history = vec![ep(2026, 4, 10, 13, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_midpoint_beyond_band_clamps_high() {
        let resolver = AnchorResolver::new(utc());
        // 20:00-22:00, midpoint 21:00 which is noon+9h
        let history = vec![ep(2026, 4, 10, 20, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_history_on_earlier_days_clamps_low() {
        let resolver = AnchorResolver::new(utc());
        let history = vec![ep(2026, 4, 7, 13, 120), ep(2026, 4, 8, 13, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        // Both midpoints precede noon-6h of the target day
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_upper_median_for_even_count() {
        let resolver = AnchorResolver::new(utc());
        // Two distinct days: midpoints on Apr 9 and Apr 10. Upper median is
        // the later one, which lies inside the band and is returned as-is.
        let history = vec![ep(2026, 4, 9, 13, 120), ep(2026, 4, 10, 15, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_longest_episode_wins_the_day() {
        let resolver = AnchorResolver::new(utc());
        // Short nap at 17:00 must lose to the longer 13:00 bout
        let history = vec![ep(2026, 4, 10, 13, 120), ep(2026, 4, 10, 17, 20)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_min_history_days_falls_back_to_noon() {
        let config = AnchorConfig {
            min_history_days: 3,
            ..Default::default()
        };
        let resolver = AnchorResolver::with_config(config, utc());
        let history = vec![ep(2026, 4, 9, 13, 120), ep(2026, 4, 10, 15, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_history_outside_lookback_ignored() {
        let resolver = AnchorResolver::new(utc());
        // 10 days before the target day: outside the 7-day lookback
        let history = vec![ep(2026, 3, 31, 13, 120)];
        let anchor = resolver.resolve(day(2026, 4, 10), &history);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_episodes_ignored() {
        let resolver = AnchorResolver::new(utc());
        let mut bad = ep(2026, 4, 10, 13, 120);
        bad.end = bad.start;
        let anchor = resolver.resolve(day(2026, 4, 10), &[bad]);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap());
    }
}
