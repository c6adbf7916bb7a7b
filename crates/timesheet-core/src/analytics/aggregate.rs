//! Per-project hour totals

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{Window, sum_hours};
use crate::models::TimeEntry;
use crate::models::entry::round_hours;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotal {
    pub name: String,
    pub total: f64,
}

impl ProjectTotal {
    /// Total rounded to 2 decimal places for display.
    pub fn rounded(&self) -> f64 {
        round_hours(self.total)
    }
}

/// Sum hours per grouping key.
///
/// Produces exactly one total per key present in `entries`. The result is
/// the same for any ordering of the input.
pub fn aggregate_by_project<'a, I>(entries: I) -> Vec<ProjectTotal>
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.grouping_key())
            .or_default()
            .push(entry.hours_value());
    }

    groups
        .into_iter()
        .map(|(name, hours)| ProjectTotal {
            name: name.to_string(),
            total: sum_hours(hours),
        })
        .collect()
}

/// Per-project totals for the entries inside `window`.
pub fn aggregate_window<Tz: TimeZone>(
    entries: &[TimeEntry],
    window: Window,
    now: &DateTime<Tz>,
) -> Vec<ProjectTotal> {
    aggregate_by_project(window.filter(entries, now))
}

/// Largest total first, ties broken by name.
pub fn sort_for_display(totals: &mut [ProjectTotal]) {
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.name.cmp(&b.name))
    });
}
