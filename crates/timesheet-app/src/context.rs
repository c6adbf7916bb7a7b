//! Application context: the collaborators every manager is built from

use std::path::PathBuf;
use std::sync::Arc;

use timesheet_core::{models::Config, storage::init_data_dir};

use crate::config::{ConfigManager, ConfigManagerError};
use crate::identity::{IdentityError, IdentityManager};
use crate::store::{DocumentStore, FileBackend, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Storage error: {0}")]
    Storage(#[from] timesheet_core::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigManagerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

pub type Result<T> = std::result::Result<T, ContextError>;

/// Built once at startup and handed to managers at construction.
///
/// A missing store or identity provider is not fatal: operations that need
/// one fail with `ContextError::NotConfigured`.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<ConfigManager>,
    store: Option<Arc<DocumentStore>>,
    identity: Option<Arc<IdentityManager>>,
    data_dir: Option<PathBuf>,
}

impl AppContext {
    /// Open the file-backed store and identity provider in the configured
    /// data directory.
    pub async fn open(config: Arc<ConfigManager>) -> Result<Self> {
        let current = config.get().await;
        let data_dir = init_data_dir(current.store.data_dir.as_deref())?;

        let store = DocumentStore::open(Arc::new(FileBackend::new(data_dir.clone()))).await?;
        let identity = IdentityManager::new(data_dir.clone(), &current.identity)?;

        tracing::info!("Application context opened at {}", data_dir.display());

        Ok(Self {
            config,
            store: Some(Arc::new(store)),
            identity: Some(Arc::new(identity)),
            data_dir: Some(data_dir),
        })
    }

    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// A context with default in-memory config and no collaborators.
    pub fn unconfigured() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> Arc<ConfigManager> {
        self.config.clone()
    }

    pub fn store(&self) -> Result<Arc<DocumentStore>> {
        self.store.clone().ok_or_else(|| {
            ContextError::NotConfigured("document store is not configured".to_string())
        })
    }

    pub fn identity(&self) -> Result<Arc<IdentityManager>> {
        self.identity.clone().ok_or_else(|| {
            ContextError::NotConfigured("identity provider is not configured".to_string())
        })
    }

    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.as_ref()
    }
}

#[derive(Default)]
pub struct AppContextBuilder {
    config: Option<Arc<ConfigManager>>,
    store: Option<Arc<DocumentStore>>,
    identity: Option<Arc<IdentityManager>>,
    data_dir: Option<PathBuf>,
}

impl AppContextBuilder {
    pub fn config(mut self, config: Arc<ConfigManager>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: Arc<DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn identity(mut self, identity: Arc<IdentityManager>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            config: self
                .config
                .unwrap_or_else(|| Arc::new(ConfigManager::ephemeral(Config::default()))),
            store: self.store,
            identity: self.identity,
            data_dir: self.data_dir,
        }
    }
}
