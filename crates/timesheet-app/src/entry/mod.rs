pub mod manager;

pub use manager::{EntryManager, EntryManagerError, format_entry_line};
