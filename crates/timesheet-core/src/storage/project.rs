//! Project storage operations (JSON format)

use crate::{Result, models::Project};
use std::path::PathBuf;

const PROJECTS_FILE: &str = "projects.json";

pub struct ProjectStorage {
    data_dir: PathBuf,
}

impl ProjectStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn load(&self) -> Result<Vec<Project>> {
        let projects_path = self.data_dir.join(PROJECTS_FILE);

        if !projects_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(projects_path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let projects: Vec<Project> = serde_json::from_str(&content)?;
        Ok(projects)
    }

    pub fn save_all(&self, projects: &[Project]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let projects_path = self.data_dir.join(PROJECTS_FILE);
        let content = serde_json::to_string_pretty(projects)?;
        std::fs::write(projects_path, content)?;

        Ok(())
    }

    pub fn append(&self, project: &Project) -> Result<()> {
        project.validate()?;

        let mut projects = self.load()?;
        projects.push(project.clone());
        self.save_all(&projects)
    }
}
