//! Closed-loop simulation commands.

use std::str::FromStr;

use clap::Subcommand;
use lucero_core::{Config, SimConfig, SleepSimulator, SleeperArchetype};

#[derive(Subcommand)]
pub enum SimAction {
    /// Run a closed-loop simulation
    Run {
        /// Sleeper archetype
        #[arg(long, default_value = "steady")]
        archetype: String,
        /// Number of nights to simulate
        #[arg(long)]
        nights: Option<u32>,
        /// Random seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Probability the sleeper follows a suggestion
        #[arg(long)]
        adherence: Option<f64>,
        /// Free time reported each morning, in hours
        #[arg(long)]
        free_time: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available sleeper archetypes
    List,
}

pub fn run(action: SimAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SimAction::Run {
            archetype,
            nights,
            seed,
            adherence,
            free_time,
            json,
        } => {
            let defaults = Config::load_or_default().sim;
            let sim_config = SimConfig {
                archetype: SleeperArchetype::from_str(&archetype)?,
                nights: nights.unwrap_or(defaults.nights),
                seed: seed.or(defaults.seed),
                adherence: adherence.unwrap_or(defaults.adherence),
                free_time_hours: free_time.unwrap_or(defaults.free_time_hours),
                rotation_days: defaults.rotation_days,
            };
            let report = SleepSimulator::with_config(sim_config).run();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} over {} nights ({} episodes)",
                    report.archetype.as_str(),
                    report.nights,
                    report.episode_count
                );
                println!("Final acute debt: {:.2} h", report.final_acute_debt_hours);
                println!("Mean daily debt:  {:.2} h", report.mean_daily_debt_hours);
                println!(
                    "Total reward:     {:+.2} over {} bandit updates",
                    report.total_reward, report.bandit_updates
                );
                println!("Suggestions:");
                for (label, count) in &report.suggestion_counts {
                    println!("  {label:<18} {count}");
                }
                println!("Arm pulls:");
                for (arm, count) in &report.arm_pulls {
                    println!("  {arm:<18} {count}");
                }
            }
        }
        SimAction::List => {
            for archetype in SleeperArchetype::ALL {
                let profile = archetype.profile();
                println!(
                    "{:<14} ideal {:.1} h, {:?} chronotype",
                    archetype.as_str(),
                    profile.ideal_hours(),
                    profile.chronotype
                );
            }
        }
    }
    Ok(())
}
