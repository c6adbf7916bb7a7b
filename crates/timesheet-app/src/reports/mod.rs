//! Derived views that consume entry snapshots

pub mod analytics;
pub mod summary;

pub use analytics::AnalyticsView;
pub use summary::SummaryView;
