//! Document store: one watch channel per collection

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use timesheet_core::models::{NewTimeEntry, Project, TimeEntry};

use super::backend::StorageBackend;
use super::live::{AllDocuments, EntryQuery, Snapshot, SnapshotListener, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] timesheet_core::Error),

    #[error("Invalid document: {0}")]
    Invalid(String),

    #[error("Task join error: {0}")]
    JoinError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Holds the entry and project collections and publishes a fresh snapshot
/// after every successful write.
///
/// Dropping the store ends every subscription once in-flight writes finish.
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    entries: Arc<watch::Sender<Snapshot<TimeEntry>>>,
    projects: Arc<watch::Sender<Snapshot<Project>>>,
    /// Serializes writes so snapshots follow write order. Held by the
    /// blocking write until its snapshot is published.
    write_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    /// Load both collections from `backend` and publish them.
    pub async fn open(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let (entries, projects) = Self::load_all(backend.clone()).await?;

        tracing::info!(
            "Document store opened with {} entries and {} projects",
            entries.len(),
            projects.len()
        );

        let (entries, _) = watch::channel(entries);
        let (projects, _) = watch::channel(projects);

        Ok(Self {
            backend,
            entries: Arc::new(entries),
            projects: Arc::new(projects),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn load_all(
        backend: Arc<dyn StorageBackend>,
    ) -> Result<(Snapshot<TimeEntry>, Snapshot<Project>)> {
        let (entries, projects) = tokio::task::spawn_blocking(move || {
            let entries = backend.load_entries()?;
            let projects = backend.load_projects()?;
            Ok::<_, timesheet_core::Error>((entries, projects))
        })
        .await
        .map_err(|e| StoreError::JoinError(e.to_string()))??;

        Ok((entries.into(), projects.into()))
    }

    /// Re-read the backend and republish both collections.
    pub async fn reload(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let (entries, projects) = Self::load_all(self.backend.clone()).await?;

        tracing::debug!(
            "Reloaded {} entries and {} projects",
            entries.len(),
            projects.len()
        );
        self.entries.send_replace(entries);
        self.projects.send_replace(projects);
        Ok(())
    }

    /// Persist a new entry and return its id.
    ///
    /// The id and write timestamp are assigned here. On failure nothing is
    /// published and the error goes back to the caller. The snapshot is
    /// published by the blocking write itself, so dropping this future after
    /// the write started still publishes it.
    pub async fn write_entry(&self, new_entry: NewTimeEntry) -> Result<String> {
        new_entry
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let guard = self.write_lock.clone().lock_owned().await;

        let id = Uuid::new_v4().to_string();
        let entry = new_entry.into_entry(id.clone(), Utc::now());

        let backend = self.backend.clone();
        let sender = self.entries.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            backend
                .append_entry(&entry)
                .inspect_err(|e| tracing::error!("Failed to write entry: {}", e))?;
            publish(&sender, entry, "entries");
            Ok::<_, timesheet_core::Error>(())
        })
        .await
        .map_err(|e| StoreError::JoinError(e.to_string()))??;

        Ok(id)
    }

    /// Persist a new project and return its id.
    pub async fn write_project(&self, name: &str, code: Option<String>) -> Result<String> {
        let name = Project::normalize_name(name).map_err(|e| StoreError::Invalid(e.to_string()))?;

        let guard = self.write_lock.clone().lock_owned().await;

        let project = Project {
            id: Uuid::new_v4().to_string(),
            name,
            code: code.filter(|c| !c.trim().is_empty()),
        };

        let id = project.id.clone();
        let backend = self.backend.clone();
        let sender = self.projects.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            backend
                .append_project(&project)
                .inspect_err(|e| tracing::error!("Failed to write project: {}", e))?;
            publish(&sender, project, "projects");
            Ok::<_, timesheet_core::Error>(())
        })
        .await
        .map_err(|e| StoreError::JoinError(e.to_string()))??;

        Ok(id)
    }

    /// Current entries, every user, in write order.
    pub fn entries_snapshot(&self) -> Snapshot<TimeEntry> {
        Arc::clone(&*self.entries.borrow())
    }

    pub fn projects_snapshot(&self) -> Snapshot<Project> {
        Arc::clone(&*self.projects.borrow())
    }

    pub fn subscribe_entries(&self, query: EntryQuery) -> Subscription<TimeEntry, EntryQuery> {
        Subscription::new(self.entries.subscribe(), query)
    }

    pub fn subscribe_projects(&self) -> Subscription<Project, AllDocuments> {
        Subscription::new(self.projects.subscribe(), AllDocuments)
    }

    /// Call `callback` with every entries snapshot matching `query`.
    pub fn listen<F>(&self, query: EntryQuery, callback: F) -> SnapshotListener
    where
        F: FnMut(Snapshot<TimeEntry>) + Send + 'static,
    {
        SnapshotListener::spawn(self.subscribe_entries(query), callback)
    }

    pub fn listen_projects<F>(&self, callback: F) -> SnapshotListener
    where
        F: FnMut(Snapshot<Project>) + Send + 'static,
    {
        SnapshotListener::spawn(self.subscribe_projects(), callback)
    }
}

fn publish<T: Clone>(sender: &watch::Sender<Snapshot<T>>, document: T, collection: &str) {
    sender.send_modify(|snapshot| {
        let mut documents = snapshot.to_vec();
        documents.push(document);
        *snapshot = documents.into();
    });
    tracing::debug!(
        "Published {} snapshot ({} documents)",
        collection,
        sender.borrow().len()
    );
}
