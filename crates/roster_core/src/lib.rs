//! Core logic for the Roster user registry.
//! This crate is the single source of truth for registry invariants: seeding,
//! CRUD, search, reset and export all go through it.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod seed;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use error::{RegistryError, RegistryResult};
pub use export::json::{export_to_dir, read_json, write_json, ExportError, EXPORT_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::user::{NewUser, UserId, UserRecord, UserValidationError};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use search::filter::{find_users, SearchTerm};
pub use seed::dataset::{SeedEntry, SeedError, SeedSet};
pub use seed::loader::{apply_seed, SeedOutcome, SeedReport};
pub use service::registry::{InitOutcome, LifecycleState, UserRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
