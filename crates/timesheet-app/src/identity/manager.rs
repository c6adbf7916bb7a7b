//! Local identity provider: account registry plus the signed-in session

use std::path::PathBuf;

use tokio::sync::{Mutex, watch};

use timesheet_core::{
    Error as CoreError, Result as CoreResult,
    models::{Identity, IdentityConfig, UserRecord, user::normalize_email},
    storage::{SessionStorage, UserStorage},
};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Storage error: {0}")]
    Storage(#[from] timesheet_core::Error),

    #[error("Invalid account details: {0}")]
    Invalid(String),

    #[error("An account for '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Task join error: {0}")]
    JoinError(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

fn invalid(error: CoreError) -> IdentityError {
    match error {
        CoreError::Validation(msg) => IdentityError::Invalid(msg),
        other => IdentityError::Storage(other),
    }
}

/// Registers accounts, signs users in and out, and broadcasts the
/// current identity to subscribers.
pub struct IdentityManager {
    data_dir: PathBuf,
    min_password_length: usize,
    state: watch::Sender<Option<Identity>>,
    /// Serializes registry and session writes.
    write_lock: Mutex<()>,
}

impl IdentityManager {
    /// Restore the remembered session from `data_dir`, if any.
    pub fn new(data_dir: PathBuf, config: &IdentityConfig) -> CoreResult<Self> {
        let session = SessionStorage::new(data_dir.clone()).load()?;
        if let Some(identity) = &session {
            tracing::info!("Restored session for {}", identity.display_name);
        }

        let (state, _) = watch::channel(session);

        Ok(Self {
            data_dir,
            min_password_length: config.min_password_length,
            state,
            write_lock: Mutex::new(()),
        })
    }

    /// Create an account and sign in as it.
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email).map_err(invalid)?;
        let _guard = self.write_lock.lock().await;

        let data_dir = self.data_dir.clone();
        let password = password.to_string();
        let min_password_length = self.min_password_length;

        let identity = tokio::task::spawn_blocking(move || {
            let users = UserStorage::new(data_dir.clone());
            if users.find_by_email(&email)?.is_some() {
                return Err(IdentityError::DuplicateEmail(email));
            }

            let user = UserRecord::new(&email, &password, min_password_length).map_err(invalid)?;
            let identity = user.identity();
            users.add(user).map_err(invalid)?;
            SessionStorage::new(data_dir).save(&identity)?;
            Ok(identity)
        })
        .await
        .map_err(|e| IdentityError::JoinError(e.to_string()))?
        .inspect_err(|e| tracing::warn!("Registration rejected: {}", e))?;

        tracing::info!("Registered and signed in as {}", identity.display_name);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let _guard = self.write_lock.lock().await;

        let data_dir = self.data_dir.clone();
        let password = password.to_string();

        let identity = tokio::task::spawn_blocking(move || {
            let user = UserStorage::new(data_dir.clone())
                .find_by_email(&email)?
                .ok_or(IdentityError::InvalidCredentials)?;

            if !user.verify_password(&password)? {
                return Err(IdentityError::InvalidCredentials);
            }

            let identity = user.identity();
            SessionStorage::new(data_dir).save(&identity)?;
            Ok(identity)
        })
        .await
        .map_err(|e| IdentityError::JoinError(e.to_string()))?
        .inspect_err(|e| tracing::warn!("Sign-in rejected: {}", e))?;

        tracing::info!("Signed in as {}", identity.display_name);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let data_dir = self.data_dir.clone();
        tokio::task::spawn_blocking(move || SessionStorage::new(data_dir).clear())
            .await
            .map_err(|e| IdentityError::JoinError(e.to_string()))??;

        if let Some(previous) = self.state.send_replace(None) {
            tracing::info!("Signed out {}", previous.display_name);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    /// The current identity, or `NotSignedIn`.
    pub fn require(&self) -> Result<Identity> {
        self.current().ok_or(IdentityError::NotSignedIn)
    }

    /// Auth state changes, starting from the current identity.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_manager(temp_dir: &TempDir) -> IdentityManager {
        IdentityManager::new(temp_dir.path().to_path_buf(), &IdentityConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);
        assert!(manager.current().is_none());
        assert!(matches!(manager.require(), Err(IdentityError::NotSignedIn)));

        let identity = manager.register(" Ada@Example.com", "secret1").await.unwrap();
        assert_eq!(identity.display_name, "ada@example.com");
        assert_eq!(manager.require().unwrap(), identity);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);

        assert!(matches!(
            manager.register("ada@example.com", "short").await,
            Err(IdentityError::Invalid(_))
        ));
        assert!(matches!(
            manager.register("nobody", "secret1").await,
            Err(IdentityError::Invalid(_))
        ));

        manager.register("ada@example.com", "secret1").await.unwrap();
        assert!(matches!(
            manager.register("ADA@example.com", "secret2").await,
            Err(IdentityError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);
        let registered = manager.register("ada@example.com", "secret1").await.unwrap();
        manager.sign_out().await.unwrap();
        assert!(manager.current().is_none());

        assert!(matches!(
            manager.sign_in("ada@example.com", "wrong-password").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            manager.sign_in("bob@example.com", "secret1").await,
            Err(IdentityError::InvalidCredentials)
        ));

        let identity = manager.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(identity, registered);
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let identity = {
            let manager = create_manager(&temp_dir);
            manager.register("ada@example.com", "secret1").await.unwrap()
        };

        let restarted = create_manager(&temp_dir);
        assert_eq!(restarted.current(), Some(identity));

        restarted.sign_out().await.unwrap();
        assert!(create_manager(&temp_dir).current().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_sees_auth_changes() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_manager(&temp_dir);
        let mut rx = manager.subscribe();
        assert!(rx.borrow_and_update().is_none());

        manager.register("ada@example.com", "secret1").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        manager.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
