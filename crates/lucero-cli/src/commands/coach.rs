//! Recommendation and bandit feedback commands.
//!
//! `suggest` persists the suggestion it prints so a later `feedback` can
//! credit the reward to the same arm and context vector.

use std::str::FromStr;

use chrono::Utc;
use clap::Subcommand;
use lucero_core::coach::Arm;
use lucero_core::{Config, StateStore};

#[derive(Subcommand)]
pub enum CoachAction {
    /// Produce a recommendation for right now
    Suggest {
        /// Free time available today, in minutes
        #[arg(long, default_value = "60")]
        free_minutes: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report how the last suggestion worked out
    Feedback {
        /// Observed reward (hours of acute debt shed; negative if it grew)
        reward: f64,
        /// Credit a specific arm instead of the suggested one
        #[arg(long)]
        arm: Option<String>,
    },
    /// Per-arm bandit statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discard learned bandit state
    Reset,
}

pub fn run(action: CoachAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = StateStore::open_default()?;

    match action {
        CoachAction::Suggest { free_minutes, json } => {
            let episodes = store.load_episodes()?;
            let coach = super::build_coach(&config, &store)?;
            let suggestion = coach.suggest(Utc::now(), &episodes, free_minutes / 60.0);
            store.save_last_suggestion(&suggestion)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&suggestion)?);
            } else {
                println!("{}: {}", suggestion.kind.label(), suggestion.rationale);
                println!("bandit arm: {}", suggestion.arm);
            }
        }
        CoachAction::Feedback { reward, arm } => {
            let Some(suggestion) = store.load_last_suggestion()? else {
                eprintln!("no stored suggestion; run `lucero coach suggest` first");
                std::process::exit(1);
            };
            let arm = match arm {
                Some(name) => Arm::from_str(&name)?,
                None => suggestion.arm,
            };
            let mut bandit = super::load_bandit(&config, &store)?;
            bandit.update(arm, reward, &suggestion.context);
            store.save_bandit(&bandit.export_state())?;
            println!("recorded reward {reward:+.2} for {arm}");
        }
        CoachAction::Stats { json } => {
            let bandit = super::load_bandit(&config, &store)?;
            let summary = bandit.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for entry in &summary {
                    let theta = entry
                        .theta
                        .iter()
                        .map(|v| format!("{v:+.3}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "{:<18} {:>3} updates  theta [{theta}]",
                        entry.arm.to_string(),
                        entry.updates
                    );
                }
            }
        }
        CoachAction::Reset => {
            if store.reset_bandit()? {
                println!("bandit state cleared");
            } else {
                println!("no bandit state on disk");
            }
        }
    }
    Ok(())
}
