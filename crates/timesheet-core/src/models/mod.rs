pub mod config;
pub mod entry;
pub mod project;
pub mod user;

pub use config::{AnalyticsConfig, Config, IdentityConfig, StoreConfig};
pub use entry::{EntryDraft, MANUAL_PROJECT, NewTimeEntry, TimeEntry};
pub use project::Project;
pub use user::{Identity, UserRecord};
