//! Today / this-week totals for one user

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::sum_hours;
use crate::models::TimeEntry;
use crate::models::entry::round_hours;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub today_total: f64,
    pub week_total: f64,
}

/// Hours the user logged for the calendar day and the Monday-start week of
/// `now`, with today taken in the timezone of `now`. Totals are rounded to 2
/// decimals.
///
/// Entries of other users are skipped.
pub fn summarize<Tz: TimeZone>(entries: &[TimeEntry], user_id: &str, now: &DateTime<Tz>) -> Summary {
    let today = now.date_naive();
    let mut day_hours = Vec::new();
    let mut week_hours = Vec::new();

    for entry in entries.iter().filter(|e| e.user_id == user_id) {
        let date = entry.calendar_date();
        if date == today {
            day_hours.push(entry.hours_value());
        }
        if is_same_week(date, today) {
            week_hours.push(entry.hours_value());
        }
    }

    Summary {
        today_total: round_hours(sum_hours(day_hours)),
        week_total: round_hours(sum_hours(week_hours)),
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(days_from_monday))
        .unwrap_or(date)
}

/// Both dates fall in the same Monday-start week.
pub fn is_same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}
