//! JSON persistence for episode history and learner state.
//!
//! Flat files under the data directory: `episodes.json` holds the sleep
//! log, `bandit.json` the exported bandit state. Both are optional on
//! disk; a missing file reads as empty history or a fresh learner.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::coach::{BanditState, Suggestion};
use crate::episode::SleepEpisode;
use crate::error::Result;

use super::data_dir;

/// File-backed store for episodes and bandit state.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store rooted at the application data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self { dir: data_dir()? })
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn episodes_path(&self) -> PathBuf {
        self.dir.join("episodes.json")
    }

    pub fn bandit_path(&self) -> PathBuf {
        self.dir.join("bandit.json")
    }

    /// Episode history, oldest first. Missing file reads as empty.
    pub fn load_episodes(&self) -> Result<Vec<SleepEpisode>> {
        let mut episodes: Vec<SleepEpisode> = read_json_or(&self.episodes_path(), Vec::new)?;
        episodes.sort_by_key(|e| e.start);
        Ok(episodes)
    }

    pub fn save_episodes(&self, episodes: &[SleepEpisode]) -> Result<()> {
        write_json(&self.episodes_path(), &episodes)
    }

    /// Append one episode and persist. Returns the new history length.
    pub fn add_episode(&self, episode: SleepEpisode) -> Result<usize> {
        let mut episodes = self.load_episodes()?;
        episodes.push(episode);
        episodes.sort_by_key(|e| e.start);
        self.save_episodes(&episodes)?;
        Ok(episodes.len())
    }

    /// Remove one episode by id. Returns whether it was present.
    pub fn remove_episode(&self, id: Uuid) -> Result<bool> {
        let mut episodes = self.load_episodes()?;
        let before = episodes.len();
        episodes.retain(|e| e.id != id);
        if episodes.len() == before {
            return Ok(false);
        }
        self.save_episodes(&episodes)?;
        Ok(true)
    }

    /// Drop episodes that ended before `cutoff`. Returns how many were
    /// removed.
    pub fn prune_episodes_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let episodes = self.load_episodes()?;
        let kept: Vec<SleepEpisode> = episodes
            .iter()
            .filter(|e| e.end >= cutoff)
            .cloned()
            .collect();
        let removed = episodes.len() - kept.len();
        if removed > 0 {
            self.save_episodes(&kept)?;
        }
        Ok(removed)
    }

    /// Persisted bandit state, or `None` when no learner has been saved.
    pub fn load_bandit(&self) -> Result<Option<BanditState>> {
        let path = self.bandit_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save_bandit(&self, state: &BanditState) -> Result<()> {
        write_json(&self.bandit_path(), state)
    }

    /// Remove the saved learner state, if any.
    pub fn reset_bandit(&self) -> Result<bool> {
        let path = self.bandit_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn suggestion_path(&self) -> PathBuf {
        self.dir.join("last_suggestion.json")
    }

    /// The most recent suggestion, kept so later feedback can be paired
    /// with the exact context it was made under.
    pub fn load_last_suggestion(&self) -> Result<Option<Suggestion>> {
        let path = self.suggestion_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save_last_suggestion(&self, suggestion: &Suggestion) -> Result<()> {
        write_json(&self.suggestion_path(), suggestion)
    }
}

fn read_json_or<T: serde::de::DeserializeOwned>(
    path: &Path,
    default: impl FnOnce() -> T,
) -> Result<T> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(_) => Ok(default()),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}
