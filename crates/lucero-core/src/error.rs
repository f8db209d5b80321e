//! Core error types for lucero-core.
//!
//! This module defines the error hierarchy using thiserror. Data-quality
//! problems (malformed episodes, missing history) are absorbed by the
//! engine with documented defaults and never surface here; these types
//! cover recoverable operational failures such as config files, episode
//! imports, and learner-state restoration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lucero-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Learner-state restoration errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors restoring persisted learner state.
///
/// State files come from disk, so shape mismatches are data-quality
/// problems reported as errors. A dimension mismatch on a live context
/// vector is a caller bug and panics instead (see the bandit module).
#[derive(Error, Debug)]
pub enum StateError {
    /// Stored state was built for a different feature dimension
    #[error("Stored bandit state has dimension {stored}, expected {expected}")]
    DimensionMismatch { stored: usize, expected: usize },

    /// Stored state has the wrong number of arms
    #[error("Stored bandit state has {stored} arms, expected {expected}")]
    ArmCountMismatch { stored: usize, expected: usize },

    /// Stored matrices/vectors are internally inconsistent
    #[error("Corrupt bandit state: {0}")]
    Corrupt(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
