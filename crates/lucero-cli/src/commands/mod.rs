//! Command implementations for the Lucero CLI.
//!
//! Every command reads the shared TOML configuration and the JSON state
//! store under the Lucero data directory, so the CLI and any embedding
//! application observe the same episodes, bandit state and settings.

pub mod coach;
pub mod config;
pub mod debt;
pub mod habits;
pub mod log;
pub mod preset;
pub mod sim;

use lucero_core::coach::{BanditConfig, Forecaster, TrendForecaster, FEATURE_DIMENSION};
use lucero_core::{Config, DebtEngine, LinUcbBandit, RecommendationPolicy, SleepCoach, StateStore};

/// Debt engine wired from the stored configuration.
pub fn build_engine(config: &Config) -> DebtEngine {
    DebtEngine::with_config(
        config.debt.clone(),
        config.profile.ideal_hours(),
        config.timezone(),
    )
}

/// Bandit restored from disk, or a fresh one from the configured defaults.
/// The dimension is pinned to the context builder's; only `alpha` is tunable.
pub fn load_bandit(
    config: &Config,
    store: &StateStore,
) -> Result<LinUcbBandit, Box<dyn std::error::Error>> {
    let bandit_config = BanditConfig {
        dimension: FEATURE_DIMENSION,
        ..config.bandit
    };
    Ok(match store.load_bandit()? {
        Some(state) => LinUcbBandit::import_state(state)?,
        None => LinUcbBandit::with_config(bandit_config),
    })
}

/// Coach assembled from the stored configuration and persisted bandit state.
pub fn build_coach(
    config: &Config,
    store: &StateStore,
) -> Result<SleepCoach, Box<dyn std::error::Error>> {
    let bandit = load_bandit(config, store)?;
    let forecaster: Box<dyn Forecaster> = Box::new(TrendForecaster::with_config(config.forecast));
    Ok(SleepCoach::with_components(
        config.profile.clone(),
        config.timezone(),
        build_engine(config),
        bandit,
        RecommendationPolicy::with_config(config.policy),
        forecaster,
    ))
}
