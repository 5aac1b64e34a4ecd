//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (highest priority, applied by the caller)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        // Load from config file if provided
        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        // Override with environment variables
        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        // Validate final configuration
        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Well-known configuration file location for this platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nepse-scraper").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader.load(None).unwrap();

        assert_eq!(settings.api.base_url, "https://www.nepalstock.com");
        assert_eq!(settings.retry.attempt_delay_ms, 3000);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
base_url = "https://mirror.example.com"
timeout_secs = 10
verify_tls = false

[retry]
max_attempts = 5
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.api.base_url, "https://mirror.example.com");
        assert_eq!(settings.api.timeout_secs, 10);
        assert!(!settings.api.verify_tls);
        assert_eq!(settings.retry.max_attempts, Some(5));
        // Untouched sections keep their defaults.
        assert_eq!(settings.retry.attempt_delay_ms, 3000);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/nonexistent/nepse/config.toml")))
            .unwrap();

        assert_eq!(settings.api.base_url, "https://www.nepalstock.com");
    }

    #[test]
    fn test_invalid_file_content_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "api = \"not a table\"").unwrap();

        let loader = ConfigLoader::new();
        let result = loader.load(Some(temp_file.path()));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_invalid_merged_settings_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
timeout_secs = 0
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let result = loader.load(Some(temp_file.path()));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_defaults_accessor() {
        let loader = ConfigLoader::new();
        assert_eq!(loader.defaults().api.timeout_secs, 30);
    }
}
