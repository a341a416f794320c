//! User domain model.
//!
//! # Responsibility
//! - Define the persisted `UserRecord` and the write-side `NewUser` input.
//! - Normalize and validate name/email before they reach storage.
//!
//! # Invariants
//! - `id` and `created_at` are owned by the store; edits only touch
//!   `name` and `email`.
//! - `email` must look like `local@domain.tld`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Store-assigned surrogate key.
pub type UserId = i64;

/// Validation failures for user-provided fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email `{0}` is not a valid address")]
    MalformedEmail(String),
}

/// One persisted registry row.
///
/// Serialized field names match the `users` table and the export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Insert time; never touched by updates.
    pub created_at: DateTime<Utc>,
}

/// Write-side input for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// `None` lets the store stamp the row with the current time.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewUser {
    /// Builds an insert request with trimmed name/email and a store-assigned
    /// creation time.
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            email: email.as_ref().trim().to_string(),
            created_at: None,
        }
    }

    /// Pins the creation timestamp, as seed entries may do.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_fields(&self.name, &self.email)
    }
}

/// Checks the editable fields of a user.
///
/// Callers are expected to pass already-trimmed values.
pub fn validate_fields(name: &str, email: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if email.trim().is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(UserValidationError::MalformedEmail(email.to_string()));
    }
    Ok(())
}
