//! Elapsed-time counter behind the entry form timer

use crate::models::entry::round_hours;

/// Decimal hours for an elapsed second count, rounded to 2 decimal places.
pub fn hours_for(elapsed_seconds: u64) -> f64 {
    round_hours(elapsed_seconds as f64 / 3600.0)
}

/// Render an elapsed second count as zero-padded `HH:MM:SS`.
pub fn format_seconds(elapsed_seconds: u64) -> String {
    let hours = elapsed_seconds / 3600;
    let minutes = (elapsed_seconds % 3600) / 60;
    let seconds = elapsed_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Counter state of the form timer.
///
/// Both the clock display and the hours value derive from `elapsed_seconds`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedCounter {
    elapsed_seconds: u64,
    running: bool,
}

impl ElapsedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from zero.
    pub fn start(&mut self) {
        self.elapsed_seconds = 0;
        self.running = true;
    }

    /// Stop counting; the reading is kept until the next start.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Reset the reading without changing the running state.
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
    }

    /// Advance by one whole second. Returns false when stopped.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn hours(&self) -> f64 {
        hours_for(self.elapsed_seconds)
    }

    pub fn display(&self) -> String {
        format_seconds(self.elapsed_seconds)
    }
}
