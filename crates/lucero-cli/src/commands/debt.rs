//! Sleep debt query commands.

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use lucero_core::episode::valid_episodes;
use lucero_core::{Config, DebtEngine, DebtSeverity, DebtTrend, EpisodeKind, SleepEpisode, StateStore};
use serde::Serialize;

#[derive(Subcommand)]
pub enum DebtAction {
    /// Current acute and accumulated debt
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-tier breakdown of the acute window
    Breakdown {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Daily debt series, oldest first
    Series {
        /// Number of days
        #[arg(long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Debt direction over recent days
    Trend {
        /// Number of days
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[derive(Serialize)]
struct DebtStatus {
    acute_debt_hours: f64,
    severity: DebtSeverity,
    total_debt_hours: f64,
    weekly_debt_hours: f64,
    trend: DebtTrend,
    window_days: u32,
}

pub fn run(action: DebtAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = StateStore::open_default()?;
    let episodes = store.load_episodes()?;
    let engine = super::build_engine(&config);
    let now = Utc::now();

    match action {
        DebtAction::Status { json } => {
            let window_days = config.debt.anchor.lookback_days;
            let acute = engine.acute_debt(now, &episodes);
            let nap_seconds = recent_nap_seconds(&config, now, &episodes);
            let status = DebtStatus {
                acute_debt_hours: acute,
                severity: DebtEngine::severity(acute),
                total_debt_hours: engine.total_debt(now, window_days, &episodes),
                weekly_debt_hours: engine.weekly_debt_with_nap_credit(
                    now,
                    window_days,
                    nap_seconds,
                    &episodes,
                ),
                trend: engine.trend(now, window_days, &episodes),
                window_days,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Acute debt:  {:.2} h ({})", status.acute_debt_hours, status.severity);
                println!("Total debt:  {:.2} h over {} days", status.total_debt_hours, status.window_days);
                println!("Weekly debt: {:.2} h (nap credit applied)", status.weekly_debt_hours);
                println!("Trend:       {}", status.trend);
            }
        }
        DebtAction::Breakdown { json } => {
            let breakdown = engine.acute_breakdown(now, &episodes);
            if json {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
            } else {
                println!(
                    "Acute debt: {:.2} h (ideal {:.1} h, effective {:.2} h)",
                    breakdown.debt_hours, breakdown.ideal_hours, breakdown.effective_hours
                );
                for tier in &breakdown.tiers {
                    println!(
                        "  {:<22} weight {:.1}  {} episodes  {:.2} h raw -> {:.2} h",
                        tier.label, tier.weight, tier.episode_count, tier.raw_hours, tier.weighted_hours
                    );
                }
            }
        }
        DebtAction::Series { days, json } => {
            let series = engine.daily_series(now, days, &episodes);
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for row in &series {
                    println!(
                        "{}  slept {:>5.2} h  debt {:>5.2} h",
                        row.day, row.slept_hours, row.debt_hours
                    );
                }
            }
        }
        DebtAction::Trend { days } => {
            println!("{}", engine.trend(now, days, &episodes));
        }
    }
    Ok(())
}

/// Seconds of nap-class sleep inside the trailing accounting window,
/// credited against the weekly figure.
fn recent_nap_seconds(config: &Config, now: DateTime<Utc>, episodes: &[SleepEpisode]) -> f64 {
    let window_start = now - Duration::hours(config.debt.window_hours);
    valid_episodes(episodes)
        .filter(|e| e.kind(config.profile.short_sleep_threshold_min) == EpisodeKind::Nap)
        .filter(|e| e.overlaps(window_start, now))
        .map(|e| e.duration().num_seconds() as f64)
        .sum()
}
