//! Persisted plugin configuration.
//!
//! Lives at `<data_dir>/TintHealth/config.toml`. Missing keys fall back to
//! their defaults and the completed file is written back at startup, so an
//! operator always finds every option spelled out.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the plugin's data folder under the host data directory
pub const DATA_FOLDER: &str = "TintHealth";

/// Name of the configuration file inside the data folder
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn default_border_enabled() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    50 // one host tick
}

/// Settings persisted across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TintHealthConfig {
    /// Whether the health border is active
    #[serde(default = "default_border_enabled")]
    pub border_enabled: bool,
    /// Period of the health polling task in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for TintHealthConfig {
    fn default() -> Self {
        Self {
            border_enabled: default_border_enabled(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl TintHealthConfig {
    /// Returns the config file path for a host data directory.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(DATA_FOLDER).join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration, seeding defaults into the file.
    ///
    /// If the file doesn't exist it is created with default values. If it
    /// exists, missing keys are filled in and the file is rewritten.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded configuration, or a `ConfigError` if reading, parsing or
    /// writing failed.
    pub async fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let config = if exists {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?
        } else {
            info!("Creating default TintHealth configuration: {}", path.display());
            TintHealthConfig::default()
        };

        config.save(path).await?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::DirectoryCreate(parent.to_path_buf(), e))?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ConfigError::FileWrite(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TintHealthConfig::default();
        assert!(config.border_enabled);
        assert_eq!(config.tick_interval_ms, 50);
    }

    #[test]
    fn test_path_in_data_dir() {
        let path = TintHealthConfig::path_in(Path::new("/srv/data"));
        assert_eq!(path, PathBuf::from("/srv/data/TintHealth/config.toml"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: TintHealthConfig = toml::from_str("").unwrap();
        assert_eq!(config, TintHealthConfig::default());

        let config: TintHealthConfig = toml::from_str("border_enabled = false").unwrap();
        assert!(!config.border_enabled);
        assert_eq!(config.tick_interval_ms, 50);
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = TintHealthConfig::path_in(dir.path());

        let config = TintHealthConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, TintHealthConfig::default());
        assert!(path.exists());

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("border_enabled = true"));
        assert!(written.contains("tick_interval_ms = 50"));
    }

    #[tokio::test]
    async fn test_load_seeds_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = TintHealthConfig::path_in(dir.path());
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "border_enabled = false\n").await.unwrap();

        let config = TintHealthConfig::load_or_create(&path).await.unwrap();
        assert!(!config.border_enabled);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("tick_interval_ms = 50"));
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = TintHealthConfig::path_in(dir.path());

        let config = TintHealthConfig {
            border_enabled: false,
            tick_interval_ms: 100,
        };
        config.save(&path).await.unwrap();

        let loaded = TintHealthConfig::load_or_create(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = TintHealthConfig::path_in(dir.path());
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "border_enabled = \"maybe\"\n").await.unwrap();

        let result = TintHealthConfig::load_or_create(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }

    #[tokio::test]
    async fn test_unreadable_location_is_read_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the data folder should be.
        let blocker = dir.path().join(DATA_FOLDER);
        tokio::fs::write(&blocker, "not a directory").await.unwrap();
        let path = TintHealthConfig::path_in(dir.path());

        let result = TintHealthConfig::load_or_create(&path).await;

        assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
        assert_eq!(
            tokio::fs::read_to_string(&blocker).await.unwrap(),
            "not a directory"
        );
    }
}
