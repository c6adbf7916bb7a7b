//! Timer events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event emitted by the timer engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerEvent {
    pub event_type: TimerEventType,
    pub timestamp: DateTime<Utc>,
}

/// Types of timer events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEventType {
    /// Timer started from zero
    Started,
    /// One whole second elapsed
    Tick { elapsed_seconds: u64, hours: f64 },
    /// Timer stopped; the reading is kept
    Stopped { elapsed_seconds: u64, hours: f64 },
}

impl TimerEvent {
    pub fn new(event_type: TimerEventType) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
        }
    }

    pub fn started() -> Self {
        Self::new(TimerEventType::Started)
    }

    pub fn tick(elapsed_seconds: u64, hours: f64) -> Self {
        Self::new(TimerEventType::Tick {
            elapsed_seconds,
            hours,
        })
    }

    pub fn stopped(elapsed_seconds: u64, hours: f64) -> Self {
        Self::new(TimerEventType::Stopped {
            elapsed_seconds,
            hours,
        })
    }
}
