//! Trailing report window

use crate::models::TimeEntry;
use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Trailing window of N days ending today, today included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Window {
    days: u32,
}

impl Window {
    pub fn new(days: u32) -> Result<Self> {
        if days == 0 {
            return Err(Error::Validation(
                "Report window must cover at least one day".to_string(),
            ));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// First calendar day inside the window, judged in the timezone of `now`.
    pub fn first_day<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        now.date_naive()
            .checked_sub_days(Days::new(u64::from(self.days - 1)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Entries whose calendar date is on or after the first day. Future
    /// dates are kept.
    pub fn filter<'a, Tz: TimeZone>(
        &self,
        entries: &'a [TimeEntry],
        now: &DateTime<Tz>,
    ) -> Vec<&'a TimeEntry> {
        let first_day = self.first_day(now);
        entries
            .iter()
            .filter(|e| e.calendar_date() >= first_day)
            .collect()
    }
}

impl TryFrom<u32> for Window {
    type Error = Error;

    fn try_from(days: u32) -> Result<Self> {
        Self::new(days)
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.days
    }
}
