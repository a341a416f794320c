//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the raw CRUD contract the lifecycle controller drives.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate input before issuing SQL.
//! - Store-level uniqueness failures surface as `RepoError::DuplicateEmail`,
//!   never as a raw SQLite error.

pub mod user_repo;
