pub mod manager;

pub use manager::{IdentityError, IdentityManager};
