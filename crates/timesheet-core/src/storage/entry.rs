//! Time entry storage operations (CSV format)

use crate::{Result, models::TimeEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENTRIES_FILE: &str = "entries.csv";

/// CSV-friendly representation of a TimeEntry
#[derive(Debug, Serialize, Deserialize)]
struct EntryCsv {
    id: String,
    user_id: String,
    user_name: String,
    project_id: String,
    project_name: String,
    task: String,
    hours: f64,
    date: String,
    created_at: String,
}

impl From<&TimeEntry> for EntryCsv {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            user_id: entry.user_id.clone(),
            user_name: entry.user_name.clone(),
            project_id: entry.project_id.clone().unwrap_or_default(),
            project_name: entry.project_name.clone().unwrap_or_default(),
            task: entry.task.clone(),
            hours: entry.hours,
            date: entry.date.to_rfc3339(),
            created_at: entry.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        }
    }
}

impl TryFrom<EntryCsv> for TimeEntry {
    type Error = crate::Error;

    fn try_from(csv: EntryCsv) -> Result<Self> {
        Ok(Self {
            id: csv.id,
            user_id: csv.user_id,
            user_name: csv.user_name,
            project_id: non_empty(csv.project_id),
            project_name: non_empty(csv.project_name),
            task: csv.task,
            hours: csv.hours,
            date: parse_timestamp(&csv.date, "date")?,
            created_at: if csv.created_at.is_empty() {
                None
            } else {
                Some(parse_timestamp(&csv.created_at, "created_at")?)
            },
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| crate::Error::InvalidData(format!("Invalid {}: {}", field, e)))
}

pub struct EntryStorage {
    data_dir: PathBuf,
}

impl EntryStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn load(&self) -> Result<Vec<TimeEntry>> {
        let entries_path = self.data_dir.join(ENTRIES_FILE);

        if !entries_path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(entries_path)?;
        let mut entries = Vec::new();

        for result in reader.deserialize() {
            let entry_csv: EntryCsv = result?;
            entries.push(TimeEntry::try_from(entry_csv)?);
        }

        Ok(entries)
    }

    pub fn append(&self, entry: &TimeEntry) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let entries_path = self.data_dir.join(ENTRIES_FILE);
        let file_exists = entries_path.exists();

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&entries_path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        // Header goes in once, when the file is created
        if !file_exists {
            writer.write_record([
                "id",
                "user_id",
                "user_name",
                "project_id",
                "project_name",
                "task",
                "hours",
                "date",
                "created_at",
            ])?;
        }

        writer.serialize(EntryCsv::from(entry))?;
        writer.flush()?;

        Ok(())
    }
}
