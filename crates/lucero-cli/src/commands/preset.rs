//! Preset pack management commands.
//!
//! Applying a pack snapshots the prior configuration to a backup file next
//! to the config, so `preset rollback` can restore it.

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use lucero_core::storage::{data_dir, find_pack, get_builtin_packs, PresetBackup};
use lucero_core::Config;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List all available preset packs
    List,

    /// Show details for a specific preset pack
    Show {
        /// Preset pack ID (e.g., "early-bird", "night-owl", "shift-worker")
        id: String,
    },

    /// Apply a preset pack to the current configuration
    Apply {
        /// Preset pack ID to apply
        id: String,
    },

    /// Rollback to the configuration from before the last apply
    Rollback,
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PresetAction::List => list_packs(),
        PresetAction::Show { id } => show_pack(&id),
        PresetAction::Apply { id } => apply_pack(&id),
        PresetAction::Rollback => rollback(),
    }
}

fn backup_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("preset_backup.json"))
}

fn list_packs() -> Result<(), Box<dyn std::error::Error>> {
    println!("Available Preset Packs:");
    println!();

    for pack in get_builtin_packs() {
        println!("  {} - {}", pack.id, pack.name);
        println!("    {}", pack.description);
        println!();
    }

    Ok(())
}

fn show_pack(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pack = find_pack(id).ok_or_else(|| format!("Preset pack '{}' not found", id))?;

    println!("{} ({})", pack.name, pack.id);
    println!("{}", "=".repeat(pack.name.len() + pack.id.len() + 3));
    println!();
    println!("Description: {}", pack.description);
    println!();
    println!("Rationale:");
    for line in pack.rationale.lines() {
        println!("  {}", line);
    }
    println!();

    if let Some(ref profile) = pack.config.profile {
        println!("Profile Settings:");
        println!("  Ideal Sleep: {:.1} h", profile.ideal_hours());
        println!("  Chronotype: {:?}", profile.chronotype);
        println!("  Usual Bed Hour: {}:00", profile.usual_bed_hour);
        println!("  Usual Wake Hour: {}:00", profile.usual_wake_hour);
        println!();
    }

    if let Some(ref debt) = pack.config.debt {
        println!("Debt Settings:");
        println!("  Nap Credit Cap: {:.0} s", debt.nap_credit_cap_seconds);
        println!("  Anchor Lookback: {} days", debt.anchor.lookback_days);
        println!();
    }

    if let Some(ref policy) = pack.config.policy {
        println!("Policy Settings:");
        println!("  Nap Length: {} min", policy.nap_length_minutes);
        println!("  Weekend Shift Threshold: {} min", policy.weekend_shift_minutes);
        println!();
    }

    Ok(())
}

fn apply_pack(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pack = find_pack(id).ok_or_else(|| format!("Preset pack '{}' not found", id))?;
    let mut config = Config::load()?;

    let backup = pack.apply_to(&mut config);
    fs::write(backup_path()?, serde_json::to_string_pretty(&backup)?)?;
    config.save()?;

    println!("Applied preset pack: {}", id);
    println!("Backup created at: {}", backup.created_at);
    println!();
    println!("Use 'preset rollback' to restore the previous configuration.");

    Ok(())
}

fn rollback() -> Result<(), Box<dyn std::error::Error>> {
    let path = backup_path()?;
    if !path.exists() {
        println!("No backup available to rollback.");
        return Ok(());
    }

    let backup: PresetBackup = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let mut config = Config::load()?;
    backup.restore(&mut config);
    config.save()?;
    fs::remove_file(&path)?;

    println!("Rolled back from preset: {}", backup.pack_id);
    println!("Previous configuration restored.");

    Ok(())
}
