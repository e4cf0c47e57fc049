use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::errors::{PortalError, Result};
use crate::utils::paths::{self, ensure_dir, write_atomic};

pub const DEFAULT_CHAPTER_NAME: &str = "NITP Abuja Chapter";
pub const DEFAULT_DATA_FILE: &str = "applications.json";
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Site-wide settings shared by the wizards, store, and certificate preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chapter_name: String,
    pub data_file: String,
    pub password_min_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chapter_name: DEFAULT_CHAPTER_NAME.into(),
            data_file: DEFAULT_DATA_FILE.into(),
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.chapter_name.trim().is_empty() {
            return Err(PortalError::Config("chapter_name cannot be empty".into()));
        }
        let data_file = Path::new(&self.data_file);
        if self.data_file.trim().is_empty() || data_file.components().count() != 1 {
            return Err(PortalError::Config(format!(
                "data_file must be a plain file name (got `{}`)",
                self.data_file
            )));
        }
        if self.password_min_length == 0 {
            return Err(PortalError::Config(
                "password_min_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and persists [`Config`] inside the portal data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let path = paths::config_file_in(&base);
        Ok(Self { base, path })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|err| PortalError::Config(format!("{}: {}", self.path.display(), err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Location of the application collection described by `config`.
    pub fn data_path(&self, config: &Config) -> PathBuf {
        self.base.join(&config.data_file)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_returns_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            chapter_name: "NITP FCT".into(),
            data_file: "intake.json".into(),
            password_min_length: 10,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(manager.data_path(&config), dir.path().join("intake.json"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "password_min_length": 12 }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.password_min_length, 12);
        assert_eq!(config.chapter_name, DEFAULT_CHAPTER_NAME);
    }

    #[test]
    fn rejects_nested_data_file() {
        let config = Config {
            data_file: "../escape.json".into(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PortalError::Config(_))));
    }
}
