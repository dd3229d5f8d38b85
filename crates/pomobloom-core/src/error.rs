//! Core error types for pomobloom-core.
//!
//! Only [`CoreError::InvalidMode`] reaches callers of the session engine;
//! [`EffectError`]s are logged and swallowed by the effects dispatcher.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomobloom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A mode key that names none of the timer modes.
    #[error("Unknown mode: '{0}'")]
    InvalidMode(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Failures of fire-and-forget side effects (sound, notifications).
#[derive(Error, Debug)]
pub enum EffectError {
    /// Notifications were not permitted at startup, or were revoked.
    #[error("Notification permission not granted")]
    PermissionDenied,

    /// Audio playback could not be started or stopped
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Notification could not be displayed
    #[error("Notification failed: {0}")]
    Notification(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
