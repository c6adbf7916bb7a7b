//! Timesheet application library
//!
//! The local document store with live snapshots, the identity provider,
//! entry and project managers, report views and the form timer, wired
//! together through an explicitly constructed [`AppContext`].

pub mod config;
pub mod context;
pub mod entry;
pub mod identity;
pub mod project;
pub mod reports;
pub mod store;
pub mod timer;

pub use config::ConfigManager;
pub use context::{AppContext, ContextError};
pub use entry::EntryManager;
pub use identity::IdentityManager;
pub use project::ProjectManager;
pub use reports::{AnalyticsView, SummaryView};
pub use store::{DocumentStore, EntryQuery, Subscription};
pub use timer::{TimerEngine, TimerEvent};
