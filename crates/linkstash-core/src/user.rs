// ABOUTME: Defines the User record and signup input validation.
// ABOUTME: Usernames are 3-8 characters and unique; source passwords are at least 6.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Errors produced by signup input validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("user name must be between 3 and 8 characters")]
    UserNameLength,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,
}

/// A registered user. The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Ulid,
    pub user_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with a fresh ULID and the current timestamp.
    pub fn new(user_name: String, password_hash: String) -> Self {
        Self {
            id: Ulid::new(),
            user_name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Validated signup input: a username and a plaintext password that both
/// passed the length constraints. Hashing happens at the auth layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub password: String,
}

impl NewUser {
    /// Validate the raw signup fields. Username length is counted in
    /// characters, not bytes.
    pub fn validate(user_name: &str, password: &str) -> Result<Self, ValidationError> {
        let name_len = user_name.chars().count();
        if !(3..=8).contains(&name_len) {
            return Err(ValidationError::UserNameLength);
        }
        if password.chars().count() < 6 {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(Self {
            user_name: user_name.to_string(),
            password: password.to_string(),
        })
    }
}
