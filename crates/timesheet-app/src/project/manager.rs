use std::sync::Arc;

use timesheet_core::models::Project;

use crate::context::{AppContext, ContextError};
use crate::identity::{IdentityError, IdentityManager};
use crate::store::{AllDocuments, DocumentStore, Snapshot, StoreError, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum ProjectManagerError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid project: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ProjectManagerError>;

pub struct ProjectManager {
    store: Arc<DocumentStore>,
    identity: Arc<IdentityManager>,
}

impl ProjectManager {
    pub fn new(ctx: &AppContext) -> Result<Self> {
        Ok(Self {
            store: ctx.store()?,
            identity: ctx.identity()?,
        })
    }

    /// Create a project. Names are trimmed and may repeat.
    pub async fn add(&self, name: &str, code: Option<String>) -> Result<String> {
        let identity = self.identity.require()?;
        let name = Project::normalize_name(name).map_err(|e| {
            tracing::warn!("Rejected project: {}", e);
            ProjectManagerError::Invalid(e.to_string())
        })?;

        let id = self.store.write_project(&name, code).await?;
        tracing::info!("{} created project '{}' ({})", identity.display_name, name, id);
        Ok(id)
    }

    pub fn list(&self) -> Snapshot<Project> {
        self.store.projects_snapshot()
    }

    pub fn subscribe(&self) -> Subscription<Project, AllDocuments> {
        self.store.subscribe_projects()
    }

    /// Find a project by id, then by exact name. The first name match wins.
    pub fn resolve(&self, key: &str) -> Option<Project> {
        let projects = self.list();
        projects
            .iter()
            .find(|p| p.id == key)
            .or_else(|| projects.iter().find(|p| p.name == key.trim()))
            .cloned()
    }
}
