//! Application settings configuration.

use serde::{Deserialize, Serialize};

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// The UI theme to use.
    pub theme: String,
    /// Whether to use vim-style keybindings.
    pub vim_mode: bool,
    /// Number of records fetched per listing page.
    pub page_size: u32,
    /// Cache time-to-live in minutes.
    pub cache_ttl_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            theme: "dark".to_string(),
            vim_mode: true,
            page_size: 50,
            cache_ttl_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.cache_ttl_minutes, 30);
        assert!(settings.vim_mode);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str("page_size = 25").unwrap();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.theme, "dark");
    }
}
