//! User identity and local account records

use crate::{Error, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in user as seen by the rest of the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

/// A registered account in the local user registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create an account, hashing the password with Argon2id.
    pub fn new(email: &str, password: &str, min_password_length: usize) -> Result<Self> {
        let email = normalize_email(email)?;

        if password.chars().count() < min_password_length {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters",
                min_password_length
            )));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        })
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        let parsed = PasswordHash::new(&self.password_hash)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id.clone(),
            display_name: self.email.clone(),
        }
    }
}

/// Trimmed, lowercased email address.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::Validation("Email cannot be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(Error::Validation(format!(
            "Invalid email address '{}'",
            email
        )));
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}
