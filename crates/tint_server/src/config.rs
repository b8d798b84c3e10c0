//! Configuration management for the TintHealth simulation host.
//!
//! Loads the host's TOML configuration, seeds a default file when none
//! exists, and validates the values after command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_world() -> String {
    "overworld".to_string()
}

fn default_demo_interval() -> u64 {
    1000
}

fn default_demo_damage() -> f64 {
    2.0
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host settings
    pub server: ServerSettings,
    /// Scripted player simulation
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Display name used in the startup banner
    pub name: String,
    /// Root directory plugins keep their data folders in
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// World new players spawn into
    #[serde(default = "default_world")]
    pub default_world: String,
}

/// Scripted demo players that take damage and regenerate on a timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Number of demo players spawned at startup (0 disables the demo)
    #[serde(default)]
    pub demo_players: usize,
    /// Period of the damage cycle in milliseconds
    #[serde(default = "default_demo_interval")]
    pub damage_interval_ms: u64,
    /// Health removed from each demo player per cycle
    #[serde(default = "default_demo_damage")]
    pub damage_amount: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            demo_players: 0,
            damage_interval_ms: default_demo_interval(),
            damage_amount: default_demo_damage(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                name: "TintHealth Test Server".to_string(),
                data_dir: default_data_dir(),
                default_world: default_world(),
            },
            simulation: SimulationSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded or default configuration, or an error if loading/creation failed.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.server.data_dir)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.data_dir.trim().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }

        if self.server.default_world.trim().is_empty() {
            return Err("Default world cannot be empty".to_string());
        }

        if self.simulation.demo_players > 0 {
            if self.simulation.damage_interval_ms == 0 {
                return Err("Demo damage interval must be greater than zero".to_string());
            }
            if !self.simulation.damage_amount.is_finite() || self.simulation.damage_amount <= 0.0 {
                return Err(format!(
                    "Demo damage amount must be a positive number, got {}",
                    self.simulation.damage_amount
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
