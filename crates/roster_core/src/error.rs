//! Caller-facing error taxonomy.
//!
//! Lower layers keep their own error enums (`DbError`, `RepoError`,
//! `SeedError`, `ExportError`); everything crossing the presentation boundary
//! is folded into `RegistryError` here.

use crate::db::DbError;
use crate::export::json::ExportError;
use crate::model::user::{UserId, UserValidationError};
use crate::repo::user_repo::RepoError;
use crate::seed::dataset::SeedError;
use crate::service::registry::LifecycleState;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The storage medium cannot be opened, created or queried. Fatal.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// Required field missing or malformed; nothing was written.
    #[error("invalid user: {0}")]
    Validation(#[from] UserValidationError),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("user not found: {0}")]
    NotFound(UserId),
    #[error("export failed: {0}")]
    ExportFailed(#[from] ExportError),
    /// A seed/import file could not be read or parsed.
    #[error("seed source rejected: {0}")]
    SeedSource(#[from] SeedError),
    #[error("registry is {0}, operation requires ready")]
    NotReady(LifecycleState),
    #[error("registry is busy ({0})")]
    Busy(LifecycleState),
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Db(err) => Self::StoreUnavailable(err.to_string()),
            RepoError::InvalidData(message) => Self::StoreUnavailable(message),
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(value: DbError) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}
