//! Domain model for registry users.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `UserId` that is never
//!   reused or mutated.
//! - Name/email validation lives on the model so every write path shares it.

pub mod user;
