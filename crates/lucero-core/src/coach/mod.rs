//! Recommendation pipeline.
//!
//! [`SleepCoach`] wires the debt engine, the contextual bandit, the rule
//! policy and a forecaster into one suggestion flow:
//!
//! 1. Compute the recent daily debt series and the acute debt.
//! 2. Derive bed/wake habits from history, falling back to the profile.
//! 3. Project near-term debt through the [`Forecaster`].
//! 4. Build the feature vector and let the bandit pick a coaching arm.
//! 5. Let the rule policy decide the concrete suggestion.
//!
//! The bandit learns from feedback passed back via
//! [`SleepCoach::observe_reward`]; the rule decision itself is
//! deterministic so every suggestion stays explainable.

pub mod bandit;
pub mod context;
pub mod forecaster;
pub mod policy;

pub use bandit::{Arm, ArmScore, ArmSummary, BanditConfig, BanditState, LinUcbBandit};
pub use context::{
    build_context, DebtForecast, FeatureVector, SuggestionContext, FEATURE_DIMENSION,
};
pub use forecaster::{ForecastConfig, Forecaster, NullForecaster, TrendForecaster};
pub use policy::{PolicyConfig, RecommendationPolicy, Suggestion, SuggestionKind};

use chrono::{DateTime, FixedOffset, Utc};

use crate::debt::DebtEngine;
use crate::episode::SleepEpisode;
use crate::error::StateError;
use crate::metrics::SleepHabits;
use crate::profile::UserProfile;

/// Facade over the full suggestion pipeline.
pub struct SleepCoach {
    profile: UserProfile,
    tz: FixedOffset,
    engine: DebtEngine,
    bandit: LinUcbBandit,
    policy: RecommendationPolicy,
    forecaster: Box<dyn Forecaster>,
}

impl SleepCoach {
    /// Coach with default engine, bandit, policy and trend forecaster.
    pub fn new(profile: UserProfile, tz: FixedOffset) -> Self {
        let engine = DebtEngine::new(profile.ideal_hours(), tz);
        Self {
            profile,
            tz,
            engine,
            bandit: LinUcbBandit::new(),
            policy: RecommendationPolicy::new(),
            forecaster: Box::new(TrendForecaster::new()),
        }
    }

    /// Coach from explicit components.
    pub fn with_components(
        profile: UserProfile,
        tz: FixedOffset,
        engine: DebtEngine,
        bandit: LinUcbBandit,
        policy: RecommendationPolicy,
        forecaster: Box<dyn Forecaster>,
    ) -> Self {
        Self {
            profile,
            tz,
            engine,
            bandit,
            policy,
            forecaster,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn debt_engine(&self) -> &DebtEngine {
        &self.engine
    }

    pub fn bandit(&self) -> &LinUcbBandit {
        &self.bandit
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    /// Produce a suggestion for `now` from the episode history and the free
    /// time available today.
    pub fn suggest(
        &self,
        now: DateTime<Utc>,
        episodes: &[SleepEpisode],
        free_time_hours: f64,
    ) -> Suggestion {
        let history_days = self.engine.config().anchor.lookback_days;
        let series = self.engine.daily_series(now, history_days, episodes);
        let debt_hours_series: Vec<f64> = series.iter().map(|d| d.debt_hours).collect();
        let acute_hours = self.engine.acute_debt(now, episodes);

        let habits = SleepHabits::from_episodes(episodes, self.tz, &self.profile);
        let chronotype = self.profile.chronotype.normalized();

        let predicted_seconds = self.forecaster.predict(&debt_hours_series);
        let features = build_context(predicted_seconds, free_time_hours, chronotype);
        let arm = self.bandit.select_arm(&features);

        let today = now.with_timezone(&self.tz).date_naive();
        let future_debt_minutes = self.forecaster.forecast_days(
            today,
            self.policy.config().lookahead_days,
            &debt_hours_series,
        );

        let ctx = SuggestionContext {
            today,
            debt_minutes: acute_hours * 60.0,
            free_minutes: free_time_hours * 60.0,
            chronotype,
            weekend_shift_minutes: habits.weekend_shift_minutes,
            usual_bed_hour: habits.usual_bed_hour,
            usual_wake_hour: habits.usual_wake_hour,
            future_debt_minutes,
        };
        let kind = self.policy.decide(&ctx);

        Suggestion {
            rationale: kind.rationale(),
            kind,
            arm,
            context: features,
        }
    }

    /// Feed an observed reward back into the bandit for the context the
    /// suggestion was made under.
    pub fn observe_reward(&mut self, arm: Arm, reward: f64, context: &FeatureVector) {
        self.bandit.update(arm, reward, context);
    }

    pub fn export_bandit_state(&self) -> BanditState {
        self.bandit.export_state()
    }

    pub fn import_bandit_state(&mut self, state: BanditState) -> Result<(), StateError> {
        self.bandit = LinUcbBandit::import_state(state)?;
        Ok(())
    }
}

/// Reward signal for a followed suggestion: positive when debt went down.
pub fn debt_improvement_reward(before_hours: f64, after_hours: f64) -> f64 {
    before_hours - after_hours
}
