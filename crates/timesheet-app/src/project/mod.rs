pub mod manager;

pub use manager::{ProjectManager, ProjectManagerError};
