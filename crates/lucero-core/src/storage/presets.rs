//! Built-in configuration presets for common sleeper types.
//!
//! Each preset is a partial configuration override with a documented
//! rationale. Applying one captures a backup of the previous values so
//! the change can be rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Config;
use crate::coach::PolicyConfig;
use crate::debt::{AnchorConfig, DebtConfig};
use crate::profile::{Chronotype, UserProfile};

/// Unique identifier for a preset pack.
pub type PresetId = String;

/// A curated preset with documented rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetPack {
    /// Unique identifier (e.g., "early-bird", "night-owl").
    pub id: PresetId,
    /// Human-readable display name.
    pub name: String,
    /// Brief description of the intended sleeper.
    pub description: String,
    /// Detailed rationale explaining why these settings work.
    pub rationale: String,
    /// The configuration values this pack applies.
    pub config: PresetConfig,
}

/// Configuration subset that a preset can override.
/// Missing sections mean "keep current value" (partial application).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetConfig {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub debt: Option<DebtConfig>,
    #[serde(default)]
    pub policy: Option<PolicyConfig>,
}

impl PresetPack {
    /// Apply this preset to the given config.
    /// Returns a backup of the original values for rollback.
    pub fn apply_to(&self, config: &mut Config) -> PresetBackup {
        let backup = PresetBackup::for_pack(&self.id, config);

        if let Some(ref profile) = self.config.profile {
            config.profile = profile.clone();
        }
        if let Some(ref debt) = self.config.debt {
            config.debt = debt.clone();
        }
        if let Some(policy) = self.config.policy {
            config.policy = policy;
        }

        backup
    }
}

/// Snapshot of config values before a preset was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetBackup {
    /// The pack that was applied.
    pub pack_id: PresetId,
    pub created_at: DateTime<Utc>,
    /// The configuration state before applying.
    pub config: Config,
}

impl PresetBackup {
    pub fn for_pack(pack_id: impl Into<String>, config: &Config) -> Self {
        Self {
            pack_id: pack_id.into(),
            created_at: Utc::now(),
            config: config.clone(),
        }
    }

    /// Restore the backed-up configuration.
    pub fn restore(&self, config: &mut Config) {
        *config = self.config.clone();
    }
}

/// Returns all built-in presets.
pub fn get_builtin_packs() -> Vec<PresetPack> {
    vec![early_bird_pack(), night_owl_pack(), shift_worker_pack()]
}

/// Find a built-in preset by ID.
pub fn find_pack(id: &str) -> Option<PresetPack> {
    get_builtin_packs().into_iter().find(|p| p.id == id)
}

/// Get preset IDs for listing.
pub fn pack_ids() -> Vec<&'static str> {
    vec!["early-bird", "night-owl", "shift-worker"]
}

// ============================================================================
// BUILT-IN PRESETS
// ============================================================================

/// Early Bird
///
/// Morning chronotype with an early, consistent schedule.
fn early_bird_pack() -> PresetPack {
    PresetPack {
        id: "early-bird".to_string(),
        name: "Early Bird".to_string(),
        description: "Morning type with an early, regular schedule".to_string(),
        rationale: indoc::indoc! {"
            Morning types run their whole day earlier, so the usual hours
            move to a 22:00 bedtime and a 06:00 wake. Debt thresholds stay
            at their defaults; what changes is where corrections point.

            The repayment suggestion lands at 21:00, which is still
            realistic for a morning type, and weekend drift is flagged a
            little sooner because larks feel even small Monday shifts.
        "}
        .to_string(),
        config: PresetConfig {
            profile: Some(UserProfile {
                chronotype: Chronotype::Morning,
                usual_bed_hour: 22,
                usual_wake_hour: 6,
                ..Default::default()
            }),
            debt: None,
            policy: Some(PolicyConfig {
                weekend_shift_minutes: 90.0,
                ..Default::default()
            }),
        },
    }
}

/// Night Owl
///
/// Evening chronotype with late nights and strong weekend drift.
fn night_owl_pack() -> PresetPack {
    PresetPack {
        id: "night-owl".to_string(),
        name: "Night Owl".to_string(),
        description: "Evening type with late nights and weekend drift".to_string(),
        rationale: indoc::indoc! {"
            Evening types fall asleep after midnight and drift further on
            weekends, so the drift threshold is relaxed to 150 minutes to
            avoid constant rhythm warnings for a pattern that is simply
            their chronotype.

            The ideal night is set slightly shorter (7.5 hours); owls who
            chase a full 8 against an early alarm accumulate phantom debt
            the engine would keep flagging.
        "}
        .to_string(),
        config: PresetConfig {
            profile: Some(UserProfile {
                ideal_sleep_seconds: 27000.0,
                chronotype: Chronotype::Evening,
                usual_bed_hour: 1,
                usual_wake_hour: 9,
                ..Default::default()
            }),
            debt: None,
            policy: Some(PolicyConfig {
                weekend_shift_minutes: 150.0,
                ..Default::default()
            }),
        },
    }
}

/// Shift Worker
///
/// Rotating schedule with split sleep and heavy nap reliance.
fn shift_worker_pack() -> PresetPack {
    PresetPack {
        id: "shift-worker".to_string(),
        name: "Shift Worker".to_string(),
        description: "Rotating schedule with split sleep and naps".to_string(),
        rationale: indoc::indoc! {"
            Rotating shifts break sleep into shorter bouts, so the main
            sleep threshold drops to 60 minutes to keep split sleep from
            being discounted as napping. Anchoring looks back fewer days
            because the rhythm changes with every rotation; old midpoints
            are noise rather than signal.

            Naps carry more of the recovery load on this schedule: the
            weekly credit cap doubles and the nap suggestion lengthens
            to 30 minutes.
        "}
        .to_string(),
        config: PresetConfig {
            profile: Some(UserProfile {
                short_sleep_threshold_min: 60,
                ..Default::default()
            }),
            debt: Some(DebtConfig {
                nap_credit_cap_seconds: 3600.0,
                anchor: AnchorConfig {
                    lookback_days: 4,
                    ..Default::default()
                },
                ..Default::default()
            }),
            policy: Some(PolicyConfig {
                nap_length_minutes: 30,
                ..Default::default()
            }),
        },
    }
}
