//! # Lucero Core Library
//!
//! This library provides the core logic for Lucero, a sleep debt and
//! recommendation engine. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary over the same core
//! library.
//!
//! ## Architecture
//!
//! - **Debt Engine**: acute, daily and aggregate sleep debt from episode
//!   history, with recovery-weighted durations and anchored accounting
//!   windows
//! - **Coach**: a LinUCB contextual bandit layered under a deterministic
//!   rule policy, plus a pluggable debt forecaster
//! - **Metrics**: bed/wake habit statistics with circular averaging
//! - **Storage**: TOML-based configuration and JSON persistence for
//!   episodes and learner state
//! - **Simulation**: seeded closed-loop sleeper archetypes for regression
//!   testing the whole pipeline
//!
//! ## Key Components
//!
//! - [`DebtEngine`]: debt computation over episode history
//! - [`SleepCoach`]: suggestion pipeline facade
//! - [`LinUcbBandit`]: contextual learner behind the coach
//! - [`Config`]: application configuration management

pub mod coach;
pub mod debt;
pub mod episode;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod sim;
pub mod storage;

pub use coach::{
    Arm, BanditState, FeatureVector, LinUcbBandit, RecommendationPolicy, SleepCoach, Suggestion,
    SuggestionKind, TrendForecaster,
};
pub use debt::{DebtBreakdown, DebtEngine, DebtSeverity, DebtTrend, DebtWindow, RecoveryWeights};
pub use episode::{EpisodeKind, SleepEpisode};
pub use error::{ConfigError, CoreError, StateError, ValidationError};
pub use metrics::{advice, sleep_score, Advice, SleepHabits};
pub use profile::{Chronotype, UserProfile};
pub use sim::{SimConfig, SimReport, SleepSimulator, SleeperArchetype};
pub use storage::{Config, StateStore};
