//! Seed dataset and seeding pass.
//!
//! # Responsibility
//! - Own the immutable bundled dataset used on first run and on reset.
//! - Drive seed entries through the repository insert primitive, one by one.
//!
//! # Invariants
//! - Entries are inserted in sequence order.
//! - An entry failing validation or email uniqueness is skipped and
//!   reported; the pass continues.
//! - Any other storage failure aborts the pass with an error.

pub mod dataset;
pub mod loader;
