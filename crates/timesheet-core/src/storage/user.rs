//! Local account registry and persisted session (JSON format)

use crate::{
    Error, Result,
    models::{Identity, UserRecord},
};
use std::path::PathBuf;

const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";

pub struct UserStorage {
    data_dir: PathBuf,
}

impl UserStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn load(&self) -> Result<Vec<UserRecord>> {
        let users_path = self.data_dir.join(USERS_FILE);

        if !users_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(users_path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let users: Vec<UserRecord> = serde_json::from_str(&content)?;
        Ok(users)
    }

    pub fn save(&self, users: &[UserRecord]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let users_path = self.data_dir.join(USERS_FILE);
        let content = serde_json::to_string_pretty(users)?;
        std::fs::write(users_path, content)?;

        Ok(())
    }

    /// Look up an account by its normalized email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.load()?.into_iter().find(|u| u.email == email))
    }

    /// Add an account. Emails are unique.
    pub fn add(&self, user: UserRecord) -> Result<()> {
        let mut users = self.load()?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(Error::Validation(format!(
                "An account for '{}' already exists",
                user.email
            )));
        }

        users.push(user);
        self.save(&users)
    }
}

/// The identity remembered between runs.
pub struct SessionStorage {
    data_dir: PathBuf,
}

impl SessionStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn load(&self) -> Result<Option<Identity>> {
        let session_path = self.data_dir.join(SESSION_FILE);

        if !session_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(session_path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let identity: Option<Identity> = serde_json::from_str(&content)?;
        Ok(identity)
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let session_path = self.data_dir.join(SESSION_FILE);
        let content = serde_json::to_string_pretty(identity)?;
        std::fs::write(session_path, content)?;

        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let session_path = self.data_dir.join(SESSION_FILE);
        if session_path.exists() {
            std::fs::remove_file(session_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_find_user() {
        let temp_dir = TempDir::new().unwrap();
        let storage = UserStorage::new(temp_dir.path().to_path_buf());

        let user = UserRecord::new("ada@example.com", "secret1", 6).unwrap();
        storage.add(user.clone()).unwrap();

        let found = storage.find_by_email("ada@example.com").unwrap();
        assert_eq!(found, Some(user));
        assert!(storage.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let storage = UserStorage::new(temp_dir.path().to_path_buf());

        storage
            .add(UserRecord::new("ada@example.com", "secret1", 6).unwrap())
            .unwrap();
        let result = storage.add(UserRecord::new("ADA@example.com", "secret2", 6).unwrap());

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(storage.load().unwrap().len(), 1);
    }

    #[test]
    fn test_session_round_trip_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path().to_path_buf());
        assert!(storage.load().unwrap().is_none());

        let identity = Identity {
            user_id: "u1".to_string(),
            display_name: "ada@example.com".to_string(),
        };
        storage.save(&identity).unwrap();
        assert_eq!(storage.load().unwrap(), Some(identity));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }
}
