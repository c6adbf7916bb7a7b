use std::sync::Arc;

use chrono::NaiveDate;

use timesheet_core::models::{EntryDraft, TimeEntry};

use crate::context::{AppContext, ContextError};
use crate::identity::{IdentityError, IdentityManager};
use crate::store::{DocumentStore, EntryQuery, StoreError, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum EntryManagerError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid entry: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, EntryManagerError>;

/// Logs entries for the signed-in user and serves their entry list.
pub struct EntryManager {
    store: Arc<DocumentStore>,
    identity: Arc<IdentityManager>,
}

impl EntryManager {
    pub fn new(ctx: &AppContext) -> Result<Self> {
        Ok(Self {
            store: ctx.store()?,
            identity: ctx.identity()?,
        })
    }

    /// A blank form for `today`.
    pub fn draft(&self, today: NaiveDate) -> EntryDraft {
        EntryDraft::new(today)
    }

    /// Validate the form and write it as a new entry. Returns the entry id.
    pub async fn log(&self, draft: EntryDraft) -> Result<String> {
        let identity = self.identity.require()?;

        let new_entry = draft.into_new_entry(&identity).map_err(|e| {
            tracing::warn!("Rejected entry form: {}", e);
            EntryManagerError::Invalid(e.to_string())
        })?;

        let hours = new_entry.hours;
        let project = new_entry.project_name.clone();

        let id = self.store.write_entry(new_entry).await.inspect_err(|e| {
            tracing::warn!("Failed to log entry: {}", e);
        })?;

        tracing::info!(
            "Logged {} hours on '{}' for {} ({})",
            hours,
            project,
            identity.display_name,
            id
        );
        Ok(id)
    }

    /// The signed-in user's entries, newest first.
    pub fn my_entries(&self) -> Result<Subscription<TimeEntry, EntryQuery>> {
        let identity = self.identity.require()?;
        Ok(self
            .store
            .subscribe_entries(EntryQuery::for_user(identity.user_id)))
    }

    /// Every user's entries, newest first.
    pub fn all_entries(&self) -> Subscription<TimeEntry, EntryQuery> {
        self.store.subscribe_entries(EntryQuery::all())
    }
}

/// One listing line: calendar date, project, task and rounded hours.
pub fn format_entry_line(entry: &TimeEntry) -> String {
    let task = if entry.task.is_empty() { "-" } else { entry.task.as_str() };
    format!(
        "{}  {:<20}  {:<30}  {:>6.2}h",
        entry.calendar_date().format("%Y-%m-%d"),
        entry.project_label(),
        task,
        entry.hours_rounded()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use chrono::{TimeZone, Utc};
    use timesheet_core::models::{IdentityConfig, MANUAL_PROJECT, Project};
    use tempfile::TempDir;

    async fn create_manager(temp_dir: &TempDir) -> (EntryManager, Arc<IdentityManager>) {
        let store = DocumentStore::open(Arc::new(MemoryBackend::new())).await.unwrap();
        let identity = Arc::new(
            IdentityManager::new(temp_dir.path().to_path_buf(), &IdentityConfig::default())
                .unwrap(),
        );
        let ctx = AppContext::builder()
            .store(Arc::new(store))
            .identity(identity.clone())
            .build();
        (EntryManager::new(&ctx).unwrap(), identity)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[tokio::test]
    async fn test_requires_configured_context() {
        let ctx = AppContext::unconfigured();
        assert!(matches!(
            EntryManager::new(&ctx),
            Err(EntryManagerError::Context(ContextError::NotConfigured(_)))
        ));
    }

    #[tokio::test]
    async fn test_log_requires_identity() {
        let temp_dir = TempDir::new().unwrap();
        let (manager, _) = create_manager(&temp_dir).await;

        let result = manager.log(manager.draft(today())).await;
        assert!(matches!(
            result,
            Err(EntryManagerError::Identity(IdentityError::NotSignedIn))
        ));
        assert!(manager.my_entries().is_err());
    }

    #[tokio::test]
    async fn test_log_and_list_my_entries() {
        let temp_dir = TempDir::new().unwrap();
        let (manager, identity) = create_manager(&temp_dir).await;
        identity.register("ada@example.com", "secret1").await.unwrap();

        let mut entries = manager.my_entries().unwrap();
        assert!(entries.current().is_empty());

        let project = Project {
            id: "p1".to_string(),
            name: "Alpha".to_string(),
            code: None,
        };
        manager
            .log(manager.draft(today()).with_task("Planning"))
            .await
            .unwrap();
        let id = manager
            .log(
                manager
                    .draft(today().succ_opt().unwrap())
                    .with_project(Some(project))
                    .with_hours(2.5),
            )
            .await
            .unwrap();

        let snapshot = entries.next().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].project_name.as_deref(), Some("Alpha"));
        assert_eq!(snapshot[1].project_name.as_deref(), Some(MANUAL_PROJECT));
        assert_eq!(snapshot[1].user_name, "ada@example.com");
    }

    #[tokio::test]
    async fn test_invalid_hours_never_written() {
        let temp_dir = TempDir::new().unwrap();
        let (manager, identity) = create_manager(&temp_dir).await;
        identity.register("ada@example.com", "secret1").await.unwrap();

        let mut draft = manager.draft(today());
        draft.hours = "two".to_string();
        assert!(matches!(
            manager.log(draft).await,
            Err(EntryManagerError::Invalid(_))
        ));
        assert!(manager.all_entries().current().is_empty());
    }

    #[test]
    fn test_format_entry_line() {
        let entry = TimeEntry {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            user_name: "ada@example.com".to_string(),
            project_id: None,
            project_name: None,
            task: String::new(),
            hours: 1.234,
            date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            created_at: None,
        };

        let line = format_entry_line(&entry);
        assert!(line.starts_with("2024-01-05  (manual)"));
        assert!(line.ends_with("1.23h"));
    }
}
