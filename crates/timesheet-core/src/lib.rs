//! Timesheet core library
//!
//! Domain models, timer arithmetic, report computations (window filtering,
//! per-project aggregation, daily/weekly summaries, CSV export) and the
//! file-backed storage used by the local document store.

pub mod analytics;
pub mod error;
pub mod models;
pub mod storage;
pub mod timer;

pub use error::{Error, Result};
