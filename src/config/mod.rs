//! Configuration management for LazyStock.
//!
//! This module handles loading, saving, and managing user configuration
//! including server profiles and application settings. Configuration is
//! stored as TOML in the platform config directory.

mod profile;
mod settings;

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::Settings;

/// The configuration file name.
const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The config directory could not be created.
    #[error("Could not create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    /// The config file could not be read.
    #[error("Could not read configuration file: {0}")]
    ReadError(std::io::Error),

    /// The config file could not be written.
    #[error("Could not write configuration file: {0}")]
    WriteError(std::io::Error),

    /// The config file is not valid TOML.
    #[error("Could not parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Could not serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration is structurally valid but semantically wrong.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A requested profile does not exist.
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application-wide settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured server profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// Returns the default configuration if no config file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the parsed configuration fails validation.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load the configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        debug!(profiles = config.profiles.len(), "Loaded configuration");
        Ok(config)
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save the configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::WriteError)?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("lazystock").join(CONFIG_FILE))
    }

    /// Validate the configuration.
    ///
    /// Checks each profile and rejects duplicate profile names or a
    /// default profile that does not exist.
    pub fn validate(&self) -> Result<()> {
        for profile in &self.profiles {
            profile.validate()?;
        }

        for (i, profile) in self.profiles.iter().enumerate() {
            if self.profiles[i + 1..].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !self.profiles.iter().any(|p| &p.name == default) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' is not configured",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Get the default profile.
    ///
    /// Falls back to the first configured profile when no default is set.
    pub fn get_default_profile(&self) -> Option<&Profile> {
        match &self.settings.default_profile {
            Some(name) => self.profiles.iter().find(|p| &p.name == name),
            None => self.profiles.first(),
        }
    }

    /// Get a profile by name.
    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn profile(name: &str) -> Profile {
        Profile::new(
            name.to_string(),
            "https://inventory.example.com".to_string(),
            "alice".to_string(),
        )
    }

    fn config_with_profiles() -> Config {
        Config {
            settings: Settings {
                default_profile: Some("work".to_string()),
                ..Default::default()
            },
            profiles: vec![profile("work"), profile("home")],
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = config_with_profiles();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.profiles, config.profiles);
        assert_eq!(
            loaded.settings.default_profile,
            Some("work".to_string())
        );
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not [ valid toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_profile_names_rejected() {
        let config = Config {
            settings: Settings::default(),
            profiles: vec![profile("work"), profile("work")],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let config = Config {
            settings: Settings {
                default_profile: Some("missing".to_string()),
                ..Default::default()
            },
            profiles: vec![profile("work")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_default_profile_explicit() {
        let config = config_with_profiles();
        assert_eq!(config.get_default_profile().unwrap().name, "work");
    }

    #[test]
    fn test_get_default_profile_falls_back_to_first() {
        let config = Config {
            settings: Settings::default(),
            profiles: vec![profile("home"), profile("work")],
        };
        assert_eq!(config.get_default_profile().unwrap().name, "home");
    }

    #[test]
    fn test_get_default_profile_empty() {
        assert!(Config::default().get_default_profile().is_none());
    }

    #[test]
    fn test_get_profile_not_found() {
        let config = config_with_profiles();
        assert!(matches!(
            config.get_profile("missing"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_get_profile_found() {
        let config = config_with_profiles();
        assert_eq!(config.get_profile("home").unwrap().name, "home");
    }
}
