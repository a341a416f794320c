//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure the SQLite connection backing the user registry.
//! - Ensure the fixed `users` schema exists before any read/write.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Core code must not touch `users` before migrations succeed.

use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, register_functions};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-medium failure raised while opening or bootstrapping the store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare database directory `{path}`: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "database schema version {db_version} is newer than supported {latest_supported}"
    )]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
