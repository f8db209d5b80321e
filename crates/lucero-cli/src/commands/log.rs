//! Sleep episode log commands.

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use lucero_core::{Config, EpisodeKind, SleepEpisode, StateStore};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a sleep episode
    Add {
        /// Episode start (RFC 3339, e.g. "2026-08-24T23:10:00Z")
        start: String,
        /// Episode end (RFC 3339)
        end: String,
    },
    /// List recorded episodes
    List {
        /// Only episodes starting within the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an episode by id
    Remove {
        /// Episode id
        id: String,
    },
    /// Drop episodes that ended more than N days ago
    Prune {
        /// Retention window in days
        #[arg(long, default_value = "90")]
        days: u32,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open_default()?;

    match action {
        LogAction::Add { start, end } => {
            let start: DateTime<Utc> = start.parse()?;
            let end: DateTime<Utc> = end.parse()?;
            let episode = SleepEpisode::new(start, end)?;
            let id = episode.id;
            let minutes = episode.duration_minutes();
            let count = store.add_episode(episode)?;
            println!("added {id} ({minutes} min), {count} episodes on record");
        }
        LogAction::List { days, json } => {
            let mut episodes = store.load_episodes()?;
            if let Some(days) = days {
                let cutoff = Utc::now() - Duration::days(i64::from(days));
                episodes.retain(|e| e.start >= cutoff);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&episodes)?);
            } else if episodes.is_empty() {
                println!("no episodes recorded");
            } else {
                let threshold = Config::load_or_default().profile.short_sleep_threshold_min;
                for e in &episodes {
                    let tag = match e.kind(threshold) {
                        EpisodeKind::Sleep => "sleep",
                        EpisodeKind::Nap => "nap",
                    };
                    println!(
                        "{}  {} -> {}  {:>4} min  {}",
                        e.id,
                        e.start.format("%Y-%m-%d %H:%M"),
                        e.end.format("%Y-%m-%d %H:%M"),
                        e.duration_minutes(),
                        tag
                    );
                }
            }
        }
        LogAction::Remove { id } => {
            let id: Uuid = id.parse()?;
            if store.remove_episode(id)? {
                println!("removed {id}");
            } else {
                eprintln!("no episode with id {id}");
                std::process::exit(1);
            }
        }
        LogAction::Prune { days } => {
            let cutoff = Utc::now() - Duration::days(i64::from(days));
            let removed = store.prune_episodes_before(cutoff)?;
            println!("pruned {removed} episodes older than {days} days");
        }
    }
    Ok(())
}
