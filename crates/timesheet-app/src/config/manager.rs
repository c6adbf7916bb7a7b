//! Configuration manager

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use timesheet_core::{
    Result as CoreResult,
    analytics::Window,
    models::Config,
    storage::{ConfigStorage, init_config_dir},
};

/// Config manager error
#[derive(Debug, thiserror::Error)]
pub enum ConfigManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] timesheet_core::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigManagerError>;

/// Manages application configuration
pub struct ConfigManager {
    /// None for a config that lives only in memory.
    storage: Option<ConfigStorage>,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    /// Load `config.json` from the platform config directory.
    pub fn new() -> CoreResult<Self> {
        let config_dir = init_config_dir()?;
        Self::with_dir(config_dir)
    }

    /// Load or create `config.json` inside `config_dir`.
    pub fn with_dir(config_dir: PathBuf) -> CoreResult<Self> {
        let storage = ConfigStorage::new(config_dir);

        // Load or create default config
        let config = storage.load()?;

        Ok(Self {
            storage: Some(storage),
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// A manager that never touches the filesystem.
    pub fn ephemeral(config: Config) -> Self {
        Self {
            storage: None,
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    pub async fn update(&self, config: Config) -> Result<Config> {
        config
            .validate()
            .map_err(|e| ConfigManagerError::Invalid(e.to_string()))?;

        if let Some(storage) = &self.storage {
            storage.save(&config)?;
        }

        {
            let mut current = self.config.write().await;
            *current = config.clone();
        }

        tracing::info!("Configuration updated");
        Ok(config)
    }

    /// Window used when a report is opened without an explicit day count.
    pub async fn default_window(&self) -> Result<Window> {
        let days = self.config.read().await.analytics.default_window_days;
        Ok(Window::new(days)?)
    }

    /// Change the default report window. The value must be one of the
    /// configured choices.
    pub async fn set_default_window(&self, days: u32) -> Result<Config> {
        let mut config = self.get().await;

        if !config.analytics.window_choices.contains(&days) {
            return Err(ConfigManagerError::Invalid(format!(
                "{} days is not one of the configured windows {:?}",
                days, config.analytics.window_choices
            )));
        }

        config.analytics.default_window_days = days;
        self.update(config).await
    }

    pub async fn set_log_level(&self, log_level: String) -> Result<Config> {
        let mut config = self.get().await;
        config.log_level = log_level;
        self.update(config).await
    }

    pub async fn reset_to_default(&self) -> Result<Config> {
        let config = Config::default();
        self.update(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_manager(_temp_dir: &TempDir) -> ConfigManager {
        unsafe {
            std::env::set_var("HOME", _temp_dir.path());
            std::env::set_var("XDG_CONFIG_HOME", _temp_dir.path().join("config"));
        }
        ConfigManager::new().unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_get_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);
        let config = manager.get().await;
        assert_eq!(config.version, "1.0.0");
        assert_eq!(manager.default_window().await.unwrap().days(), 7);
    }

    #[tokio::test]
    #[serial]
    async fn test_set_default_window_persists() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);

        let updated = manager.set_default_window(30).await.unwrap();
        assert_eq!(updated.analytics.default_window_days, 30);

        let reloaded = create_manager(&temp_dir);
        assert_eq!(reloaded.get().await.analytics.default_window_days, 30);
    }

    #[tokio::test]
    async fn test_set_default_window_outside_choices() {
        let manager = ConfigManager::ephemeral(Config::default());

        let result = manager.set_default_window(5).await;
        assert!(matches!(result, Err(ConfigManagerError::Invalid(_))));
        assert_eq!(manager.get().await.analytics.default_window_days, 7);
    }

    #[tokio::test]
    async fn test_invalid_log_level_rejected() {
        let manager = ConfigManager::ephemeral(Config::default());

        assert!(manager.set_log_level("loud".to_string()).await.is_err());
        let updated = manager.set_log_level("debug".to_string()).await.unwrap();
        assert_eq!(updated.log_level, "debug");
    }

    #[tokio::test]
    async fn test_reset_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(temp_dir.path().to_path_buf()).unwrap();

        manager.set_default_window(90).await.unwrap();
        let reset = manager.reset_to_default().await.unwrap();
        assert_eq!(reset, Config::default());
    }
}
