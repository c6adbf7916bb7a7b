use chrono::{DateTime, TimeZone};

use timesheet_core::{
    analytics::{Summary, summarize},
    models::TimeEntry,
};

use crate::store::Snapshot;

/// Today and this-week totals for one user, refreshed per snapshot.
pub struct SummaryView {
    user_id: String,
    summary: Summary,
}

impl SummaryView {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            summary: Summary::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn replace_snapshot<Tz: TimeZone>(&mut self, snapshot: &Snapshot<TimeEntry>, now: &DateTime<Tz>) {
        self.summary = summarize(snapshot, &self.user_id, now);
        tracing::debug!(
            "Summary for {}: today {} h, week {} h",
            self.user_id,
            self.summary.today_total,
            self.summary.week_total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(user_id: &str, hours: f64, date: DateTime<Utc>) -> TimeEntry {
        TimeEntry {
            id: format!("{}-{}", user_id, date),
            user_id: user_id.to_string(),
            user_name: format!("{}@example.com", user_id),
            project_id: None,
            project_name: None,
            task: String::new(),
            hours,
            date,
            created_at: None,
        }
    }

    #[test]
    fn test_summary_tracks_latest_snapshot() {
        // Wednesday.
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut view = SummaryView::new("me");
        assert_eq!(view.summary(), Summary::default());

        let snapshot: Snapshot<TimeEntry> = vec![
            entry("me", 1.5, today),
            entry("me", 2.0, today - Duration::days(1)),
            entry("you", 9.0, today),
        ]
        .into();
        view.replace_snapshot(&snapshot, &now);
        assert_eq!(view.summary().today_total, 1.5);
        assert_eq!(view.summary().week_total, 3.5);

        let empty: Snapshot<TimeEntry> = Vec::new().into();
        view.replace_snapshot(&empty, &now);
        assert_eq!(view.summary(), Summary::default());
    }
}
