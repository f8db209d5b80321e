//! Debt accounting: recovery weights, window anchoring, and the debt engine.

pub mod anchor;
pub mod engine;
pub mod weight;

pub use anchor::{AnchorConfig, AnchorResolver};
pub use engine::{
    DailyDebt, DebtBreakdown, DebtConfig, DebtEngine, DebtSeverity, DebtTrend, TierContribution,
};
pub use weight::RecoveryWeights;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::episode::SleepEpisode;

/// One day's accounting window: `[anchor, anchor + length)`.
///
/// The anchor always lies within the resolver's clamp band around local
/// noon. Windows are computed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtWindow {
    pub anchor: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DebtWindow {
    pub fn starting_at(anchor: DateTime<Utc>, length: Duration) -> Self {
        Self {
            anchor,
            end: anchor + length,
        }
    }

    pub fn length(&self) -> Duration {
        self.end - self.anchor
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.anchor && t < self.end
    }

    /// True if the episode overlaps the window interval.
    pub fn overlapped_by(&self, episode: &SleepEpisode) -> bool {
        episode.overlaps(self.anchor, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_window_bounds_are_half_open() {
        let anchor = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let window = DebtWindow::starting_at(anchor, Duration::hours(24));
        assert!(window.contains(anchor));
        assert!(!window.contains(window.end));
        assert_eq!(window.length(), Duration::hours(24));
    }

    #[test]
    fn test_window_overlap_boundary() {
        let anchor = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let window = DebtWindow::starting_at(anchor, Duration::hours(24));
        // Ends exactly at the anchor: no overlap
        let before = SleepEpisode {
            id: Uuid::new_v4(),
            start: anchor - Duration::hours(8),
            end: anchor,
        };
        assert!(!window.overlapped_by(&before));
        // Crosses the anchor by a minute: overlap
        let crossing = SleepEpisode {
            id: Uuid::new_v4(),
            start: anchor - Duration::hours(8),
            end: anchor + Duration::minutes(1),
        };
        assert!(window.overlapped_by(&crossing));
    }
}
