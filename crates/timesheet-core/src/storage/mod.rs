pub mod config;
pub mod entry;
pub mod project;
pub mod user;

pub use config::ConfigStorage;
pub use entry::EntryStorage;
pub use project::ProjectStorage;
pub use user::{SessionStorage, UserStorage};

use crate::{Error, Result};
use std::path::PathBuf;

pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("timesheet"))
        .ok_or_else(|| Error::NotConfigured("Could not find data directory".to_string()))
}

pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("timesheet"))
        .ok_or_else(|| Error::NotConfigured("Could not find config directory".to_string()))
}

/// Create the data directory, honouring an explicit override.
pub fn init_data_dir(override_dir: Option<&str>) -> Result<PathBuf> {
    let data_dir = match override_dir {
        Some(dir) => PathBuf::from(dir),
        None => get_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

pub fn init_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}
