//! Sleep habit statistics commands.

use chrono::{Duration, Utc};
use clap::Subcommand;
use lucero_core::{advice, sleep_score, Config, SleepHabits, StateStore};

#[derive(Subcommand)]
pub enum HabitsAction {
    /// Habit summary over recent history
    Show {
        /// Only episodes starting within the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Threshold-triggered advice for the current habits
    Advice,
    /// Score a single night
    Score {
        /// Hours slept
        duration_hours: f64,
        /// Subjective quality 1-5
        #[arg(long)]
        quality: Option<u8>,
    },
}

pub fn run(action: HabitsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = StateStore::open_default()?;

    match action {
        HabitsAction::Show { days, json } => {
            let habits = load_habits(&config, &store, days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else {
                println!("Nights tracked:      {}", habits.nights);
                println!("Usual bed hour:      {}:00", habits.usual_bed_hour);
                println!("Usual wake hour:     {}:00", habits.usual_wake_hour);
                println!("Average sleep:       {:.2} h", habits.average_sleep_hours);
                println!("Weekend shift:       {:.0} min", habits.weekend_shift_minutes);
                println!("Bedtime variability: {:.0} min", habits.bedtime_variability_minutes);
                println!("Regularity index:    {:.0}/100", habits.regularity_index);
            }
        }
        HabitsAction::Advice => {
            let episodes = store.load_episodes()?;
            let habits = SleepHabits::from_episodes(&episodes, config.timezone(), &config.profile);
            let engine = super::build_engine(&config);
            let trend = engine.trend(Utc::now(), config.debt.anchor.lookback_days, &episodes);
            let entries = advice(&habits, trend);
            if entries.is_empty() {
                println!("no advice triggered; habits look stable");
            } else {
                for entry in &entries {
                    println!("[{}] {}", entry.priority, entry.message);
                }
            }
        }
        HabitsAction::Score {
            duration_hours,
            quality,
        } => {
            let quality = quality.unwrap_or(config.profile.default_sleep_quality);
            let score = sleep_score(duration_hours, config.profile.ideal_hours(), quality);
            println!("{score:.1}");
        }
    }
    Ok(())
}

fn load_habits(
    config: &Config,
    store: &StateStore,
    days: Option<u32>,
) -> Result<SleepHabits, Box<dyn std::error::Error>> {
    let mut episodes = store.load_episodes()?;
    if let Some(days) = days {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        episodes.retain(|e| e.start >= cutoff);
    }
    Ok(SleepHabits::from_episodes(
        &episodes,
        config.timezone(),
        &config.profile,
    ))
}
