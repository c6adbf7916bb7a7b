//! Project data model

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A project entries can be logged against.
///
/// Names are not unique; two projects may share a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Project {
    /// Trimmed project name, rejecting blank input.
    pub fn normalize_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "Project name cannot be empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("Project ID cannot be empty".to_string()));
        }
        Self::normalize_name(&self.name)?;
        Ok(())
    }
}
