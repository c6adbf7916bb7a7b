use chrono::{DateTime, TimeZone};

use timesheet_core::{
    Result as CoreResult,
    analytics::{CsvExport, ProjectTotal, Window, aggregate_window, export_window, sort_for_display},
    models::TimeEntry,
};

use crate::store::Snapshot;

/// Per-project totals over a trailing window of the latest snapshot.
///
/// Totals are recomputed in full whenever the snapshot or the window
/// changes. They are kept sorted for display, largest first.
pub struct AnalyticsView {
    window: Window,
    snapshot: Snapshot<TimeEntry>,
    totals: Vec<ProjectTotal>,
}

impl AnalyticsView {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            snapshot: Vec::new().into(),
            totals: Vec::new(),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn snapshot(&self) -> &Snapshot<TimeEntry> {
        &self.snapshot
    }

    pub fn totals(&self) -> &[ProjectTotal] {
        &self.totals
    }

    pub fn replace_snapshot<Tz: TimeZone>(&mut self, snapshot: Snapshot<TimeEntry>, now: &DateTime<Tz>) {
        self.snapshot = snapshot;
        self.recompute(now);
    }

    pub fn set_window<Tz: TimeZone>(&mut self, window: Window, now: &DateTime<Tz>) {
        self.window = window;
        self.recompute(now);
    }

    /// CSV of the entries inside the current window.
    pub fn export<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CoreResult<CsvExport> {
        export_window(&self.snapshot, self.window, now)
    }

    fn recompute<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let mut totals = aggregate_window(&self.snapshot, self.window, now);
        sort_for_display(&mut totals);
        tracing::debug!(
            "Analytics recomputed: {} projects over {} days",
            totals.len(),
            self.window.days()
        );
        self.totals = totals;
    }
}
