//! Persistence backends behind the document store

use std::path::PathBuf;
use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use timesheet_core::{
    Error, Result,
    models::{Project, TimeEntry},
    storage::{EntryStorage, ProjectStorage},
};

/// Blocking persistence of the two collections.
///
/// Calls may block on IO; the store runs them on the blocking pool.
pub trait StorageBackend: Send + Sync {
    fn load_entries(&self) -> Result<Vec<TimeEntry>>;
    fn append_entry(&self, entry: &TimeEntry) -> Result<()>;
    fn load_projects(&self) -> Result<Vec<Project>>;
    fn append_project(&self, project: &Project) -> Result<()>;
}

/// Entries in `entries.csv`, projects in `projects.json`.
pub struct FileBackend {
    entries: EntryStorage,
    projects: ProjectStorage,
}

impl FileBackend {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            entries: EntryStorage::new(data_dir.clone()),
            projects: ProjectStorage::new(data_dir),
        }
    }
}

impl StorageBackend for FileBackend {
    fn load_entries(&self) -> Result<Vec<TimeEntry>> {
        self.entries.load()
    }

    fn append_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.entries.append(entry)
    }

    fn load_projects(&self) -> Result<Vec<Project>> {
        self.projects.load()
    }

    fn append_project(&self, project: &Project) -> Result<()> {
        self.projects.append(project)
    }
}

/// Keeps both collections in memory. Used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<TimeEntry>>,
    projects: Mutex<Vec<Project>>,
    reject_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<TimeEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Make every following write fail, as an unreachable backend would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "backend is rejecting writes",
            )));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StorageBackend for MemoryBackend {
    fn load_entries(&self) -> Result<Vec<TimeEntry>> {
        Ok(lock(&self.entries).clone())
    }

    fn append_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.check_writable()?;
        lock(&self.entries).push(entry.clone());
        Ok(())
    }

    fn load_projects(&self) -> Result<Vec<Project>> {
        Ok(lock(&self.projects).clone())
    }

    fn append_project(&self, project: &Project) -> Result<()> {
        self.check_writable()?;
        project.validate()?;
        lock(&self.projects).push(project.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(id: &str) -> TimeEntry {
        TimeEntry {
            id: id.to_string(),
            user_id: "u1".to_string(),
            user_name: "ada@example.com".to_string(),
            project_id: None,
            project_name: Some("(manual)".to_string()),
            task: String::new(),
            hours: 1.0,
            date: Utc::now(),
            created_at: None,
        }
    }

    #[test]
    fn test_memory_backend_rejects_writes_on_demand() {
        let backend = MemoryBackend::new();
        backend.append_entry(&entry("e1")).unwrap();

        backend.set_reject_writes(true);
        assert!(backend.append_entry(&entry("e2")).is_err());
        assert_eq!(backend.load_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_file_backend_uses_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().to_path_buf());

        backend
            .append_project(&Project {
                id: "p1".to_string(),
                name: "Alpha".to_string(),
                code: None,
            })
            .unwrap();

        assert!(temp_dir.path().join("projects.json").exists());
        assert_eq!(backend.load_projects().unwrap().len(), 1);
        assert!(backend.load_entries().unwrap().is_empty());
    }
}
