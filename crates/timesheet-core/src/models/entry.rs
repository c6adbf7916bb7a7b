//! Time entry data model

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Identity, Project};

/// Label used for entries that are not attached to a project.
pub const MANUAL_PROJECT: &str = "(manual)";

/// A persisted timesheet entry.
///
/// Entries are never edited in place; a correction is a new entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub task: String,
    /// Hours as entered. Documents written by other clients may carry a
    /// string or nothing here; anything that is not a number reads as NaN.
    #[serde(default, deserialize_with = "lenient_hours")]
    pub hours: f64,
    /// Calendar date the work applies to, stored as UTC midnight.
    pub date: DateTime<Utc>,
    /// Write timestamp assigned by the store. Audit only.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Entry content before the store assigns an id and write timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTimeEntry {
    pub user_id: String,
    pub user_name: String,
    pub project_id: Option<String>,
    pub project_name: String,
    pub task: String,
    pub hours: f64,
    pub date: DateTime<Utc>,
}

/// Raw values of the entry form, as typed by the user or filled by the timer.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub project: Option<Project>,
    pub task: String,
    pub hours: String,
    pub date: String,
}

impl TimeEntry {
    /// Key used to bucket this entry in per-project reports.
    ///
    /// Falls back from the project name to the project id, then to the
    /// manual label. Two projects sharing a name share a bucket.
    pub fn grouping_key(&self) -> &str {
        match (self.project_name.as_deref(), self.project_id.as_deref()) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(id)) if !id.is_empty() => id,
            _ => MANUAL_PROJECT,
        }
    }

    /// Hours usable in sums: non-finite values count as zero.
    pub fn hours_value(&self) -> f64 {
        if self.hours.is_finite() { self.hours } else { 0.0 }
    }

    /// Hours rounded to 2 decimal places for display.
    pub fn hours_rounded(&self) -> f64 {
        round_hours(self.hours_value())
    }

    /// Project label for listings.
    pub fn project_label(&self) -> &str {
        match self.project_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => MANUAL_PROJECT,
        }
    }

    /// Calendar day the work applies to.
    ///
    /// Dates are stored as UTC midnight of the chosen day, so the UTC date is
    /// the day regardless of the reader's timezone.
    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

impl NewTimeEntry {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation("User ID cannot be empty".to_string()));
        }

        if !self.hours.is_finite() {
            return Err(Error::Validation("Hours must be a number".to_string()));
        }

        if self.hours < 0.0 {
            return Err(Error::Validation("Hours cannot be negative".to_string()));
        }

        if self.project_name.trim().is_empty() {
            return Err(Error::Validation(
                "Project name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Attach the store-assigned identity of the document.
    pub fn into_entry(self, id: String, created_at: DateTime<Utc>) -> TimeEntry {
        TimeEntry {
            id,
            user_id: self.user_id,
            user_name: self.user_name,
            project_id: self.project_id,
            project_name: Some(self.project_name),
            task: self.task,
            hours: self.hours,
            date: self.date,
            created_at: Some(created_at),
        }
    }
}

impl EntryDraft {
    /// A fresh form: one hour on the given day, no project.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            project: None,
            task: String::new(),
            hours: "1".to_string(),
            date: today.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn with_project(mut self, project: Option<Project>) -> Self {
        self.project = project;
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Fill the hours field from a timer reading.
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours = hours.to_string();
        self
    }

    /// Parse and validate the form for the signed-in user.
    pub fn into_new_entry(self, identity: &Identity) -> Result<NewTimeEntry> {
        let hours = parse_hours(&self.hours)?;
        let date = parse_entry_date(&self.date)?;

        let (project_id, project_name) = match self.project {
            Some(project) => {
                let name = if project.name.trim().is_empty() {
                    MANUAL_PROJECT.to_string()
                } else {
                    project.name
                };
                (Some(project.id).filter(|id| !id.is_empty()), name)
            }
            None => (None, MANUAL_PROJECT.to_string()),
        };

        let entry = NewTimeEntry {
            user_id: identity.user_id.clone(),
            user_name: identity.display_name.clone(),
            project_id,
            project_name,
            task: self.task,
            hours,
            date,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Round an hour value to 2 decimal places.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Parse the hours field: a finite, non-negative decimal.
pub fn parse_hours(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Hours are required".to_string()));
    }

    let hours: f64 = trimmed
        .parse()
        .map_err(|_| Error::Validation(format!("Hours must be a number, got '{}'", trimmed)))?;

    if !hours.is_finite() {
        return Err(Error::Validation(format!(
            "Hours must be a number, got '{}'",
            trimmed
        )));
    }

    if hours < 0.0 {
        return Err(Error::Validation("Hours cannot be negative".to_string()));
    }

    Ok(hours)
}

/// Parse a `YYYY-MM-DD` form date into the stored UTC-midnight instant.
pub fn parse_entry_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Validation(format!("Invalid date '{}': {}", input.trim(), e)))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn lenient_hours<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(_) => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(project_name: Option<&str>, project_id: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            user_name: "u1@example.com".to_string(),
            project_id: project_id.map(str::to_string),
            project_name: project_name.map(str::to_string),
            task: String::new(),
            hours: 1.0,
            date: Utc::now(),
            created_at: None,
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "u1".to_string(),
            display_name: "u1@example.com".to_string(),
        }
    }

    #[test]
    fn test_grouping_key_fallbacks() {
        assert_eq!(entry(Some("Alpha"), Some("p1")).grouping_key(), "Alpha");
        assert_eq!(entry(None, Some("p1")).grouping_key(), "p1");
        assert_eq!(entry(Some(""), Some("p1")).grouping_key(), "p1");
        assert_eq!(entry(None, None).grouping_key(), MANUAL_PROJECT);
        assert_eq!(entry(Some(""), Some("")).grouping_key(), MANUAL_PROJECT);
    }

    #[test]
    fn test_hours_value_ignores_nan() {
        let mut e = entry(None, None);
        e.hours = f64::NAN;
        assert_eq!(e.hours_value(), 0.0);

        e.hours = 1.234;
        assert_eq!(e.hours_rounded(), 1.23);
    }

    #[test]
    fn test_lenient_hours_deserialization() {
        let base = json!({
            "id": "e1",
            "user_id": "u1",
            "date": "2024-01-05T00:00:00Z",
        });

        let mut doc = base.clone();
        doc["hours"] = json!("2.5");
        let parsed: TimeEntry = serde_json::from_value(doc).unwrap();
        assert_eq!(parsed.hours, 2.5);

        let mut doc = base.clone();
        doc["hours"] = json!("abc");
        let parsed: TimeEntry = serde_json::from_value(doc).unwrap();
        assert!(parsed.hours.is_nan());
        assert_eq!(parsed.hours_value(), 0.0);

        let parsed: TimeEntry = serde_json::from_value(base).unwrap();
        assert_eq!(parsed.hours, 0.0);
        assert_eq!(parsed.project_name, None);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("1.5").unwrap(), 1.5);
        assert_eq!(parse_hours(" 0 ").unwrap(), 0.0);
        assert!(parse_hours("").is_err());
        assert!(parse_hours("abc").is_err());
        assert!(parse_hours("NaN").is_err());
        assert!(parse_hours("inf").is_err());
        assert!(parse_hours("-1").is_err());
    }

    #[test]
    fn test_parse_entry_date_is_utc_midnight() {
        let date = parse_entry_date("2024-01-05").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-05T00:00:00+00:00");
        assert!(parse_entry_date("05/01/2024").is_err());
    }

    #[test]
    fn test_calendar_date_ignores_reader_timezone() {
        let mut entry = entry(None, None);
        entry.date = parse_entry_date("2024-01-05").unwrap();
        assert_eq!(entry.calendar_date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_draft_without_project_uses_manual_label() {
        let draft = EntryDraft::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .with_task("Review");
        let new_entry = draft.into_new_entry(&identity()).unwrap();

        assert_eq!(new_entry.project_id, None);
        assert_eq!(new_entry.project_name, MANUAL_PROJECT);
        assert_eq!(new_entry.hours, 1.0);
        assert_eq!(new_entry.user_name, "u1@example.com");
    }

    #[test]
    fn test_draft_with_project() {
        let project = Project {
            id: "p1".to_string(),
            name: "Alpha".to_string(),
            code: None,
        };
        let draft = EntryDraft::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .with_project(Some(project))
            .with_hours(0.25);
        let new_entry = draft.into_new_entry(&identity()).unwrap();

        assert_eq!(new_entry.project_id.as_deref(), Some("p1"));
        assert_eq!(new_entry.project_name, "Alpha");
        assert_eq!(new_entry.hours, 0.25);
    }

    #[test]
    fn test_draft_rejects_invalid_hours() {
        let mut draft = EntryDraft::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        draft.hours = "lots".to_string();
        assert!(matches!(
            draft.into_new_entry(&identity()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_into_entry_keeps_values() {
        let draft = EntryDraft::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let created = Utc::now();
        let entry = draft
            .into_new_entry(&identity())
            .unwrap()
            .into_entry("doc-1".to_string(), created);

        assert_eq!(entry.id, "doc-1");
        assert_eq!(entry.created_at, Some(created));
        assert_eq!(entry.project_name.as_deref(), Some(MANUAL_PROJECT));
    }
}
