//! Error types for the TintHealth plugin

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;
use tint_event_system::PluginError;

/// Plugin configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to create config directory {0}: {1}")]
    DirectoryCreate(PathBuf, IoError),

    #[error("Failed to read config file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file {0}: {1}")]
    FileWrite(PathBuf, IoError),
}

/// Errors raised while an operator command is being handled.
///
/// The `Display` text of each variant is the message shown to the sender.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("You must run this command as player!")]
    NotAPlayer,

    #[error("Usage: /tinthealth sethp [hp]")]
    MissingHealthValue,

    #[error("{0} is not a number")]
    NotANumber(String),

    #[error("{0} must not be negative")]
    NegativeHealth(String),

    #[error("{requested} exceeds the max hp ({max}).")]
    ExceedsMaxHealth { requested: String, max: f64 },

    #[error("Could not set your health: {0}")]
    HostRejected(String),
}

/// Top-level plugin errors
#[derive(Debug, Error)]
pub enum TintHealthError {
    #[error("WorldBorderApi service isn't registered; install a world-border provider to use this plugin")]
    BorderServiceMissing,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<TintHealthError> for PluginError {
    fn from(error: TintHealthError) -> Self {
        match error {
            TintHealthError::BorderServiceMissing => PluginError::NotFound(error.to_string()),
            TintHealthError::Config(_) => PluginError::InitializationFailed(error.to_string()),
        }
    }
}
