mod config;
pub mod presets;
mod state;

pub use config::Config;
pub use presets::{find_pack, get_builtin_packs, pack_ids, PresetBackup, PresetConfig, PresetPack};
pub use state::StateStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/lucero[-dev]/` based on LUCERO_ENV.
///
/// Set LUCERO_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LUCERO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lucero-dev")
    } else {
        base_dir.join("lucero")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
