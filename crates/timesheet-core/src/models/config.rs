//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub log_level: String,
    pub store: StoreConfig,
    pub analytics: AnalyticsConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreConfig {
    /// Overrides the platform data directory when set.
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    pub default_window_days: u32,
    pub window_choices: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityConfig {
    pub min_password_length: usize,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        self.store.validate()?;
        self.analytics.validate()?;
        self.identity.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            log_level: "info".to_string(),
            store: StoreConfig::default(),
            analytics: AnalyticsConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref dir) = self.data_dir {
            if dir.trim().is_empty() {
                return Err(Error::Validation(
                    "Data directory cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl AnalyticsConfig {
    /// Upper bound for a report window, roughly ten years.
    pub const MAX_WINDOW_DAYS: u32 = 3660;

    pub fn validate(&self) -> Result<()> {
        if self.window_choices.is_empty() {
            return Err(Error::Validation(
                "At least one report window must be configured".to_string(),
            ));
        }

        for days in self
            .window_choices
            .iter()
            .chain(std::iter::once(&self.default_window_days))
        {
            if *days == 0 || *days > Self::MAX_WINDOW_DAYS {
                return Err(Error::Validation(format!(
                    "Report window must be between 1 and {} days, got {}",
                    Self::MAX_WINDOW_DAYS,
                    days
                )));
            }
        }

        if !self.window_choices.contains(&self.default_window_days) {
            return Err(Error::Validation(format!(
                "Default window {} is not one of the configured choices",
                self.default_window_days
            )));
        }

        Ok(())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: 7,
            window_choices: vec![7, 14, 30, 90],
        }
    }
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_password_length == 0 {
            return Err(Error::Validation(
                "Minimum password length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0.0");
        assert!(config.store.data_dir.is_none());
        assert_eq!(config.analytics.default_window_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_analytics_config_validation() {
        let mut config = AnalyticsConfig::default();
        assert!(config.validate().is_ok());

        config.default_window_days = 5;
        assert!(config.validate().is_err());

        config.window_choices = vec![0, 5];
        assert!(config.validate().is_err());

        config.window_choices = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_validation() {
        let config = StoreConfig {
            data_dir: Some("  ".to_string()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identity_config_validation() {
        let config = IdentityConfig {
            min_password_length: 0,
        };
        assert!(config.validate().is_err());
    }
}
