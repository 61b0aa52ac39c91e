//! Inventory server profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// A server profile configuration.
///
/// Profiles store connection details for an inventory server.
/// API tokens are stored separately in the OS keychain for security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The server URL.
    ///
    /// Should be a valid HTTPS URL (e.g., "https://inventory.example.com").
    pub url: String,

    /// The login name used against this server.
    pub username: String,
}

impl Profile {
    /// Create a new profile.
    pub fn new(name: String, url: String, username: String) -> Self {
        Self {
            name,
            url,
            username,
        }
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and contains no whitespace
    /// - The URL is non-empty and has a valid scheme
    /// - The username is non-empty
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation
    /// fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}' has an empty URL",
                self.name
            )));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}' URL must start with http:// or https://",
                self.name
            )));
        }

        if self.username.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}' has an empty username",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> Profile {
        Profile::new(
            "work".to_string(),
            "https://inventory.example.com".to_string(),
            "alice".to_string(),
        )
    }

    #[test]
    fn test_valid_profile() {
        assert!(valid_profile().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut profile = valid_profile();
        profile.name = String::new();
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut profile = valid_profile();
        profile.name = "my profile".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut profile = valid_profile();
        profile.url = String::new();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_bad_scheme_rejected() {
        let mut profile = valid_profile();
        profile.url = "ftp://inventory.example.com".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_http_scheme_allowed() {
        let mut profile = valid_profile();
        profile.url = "http://localhost:8000".to_string();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        let mut profile = valid_profile();
        profile.username = String::new();
        assert!(profile.validate().is_err());
    }
}
