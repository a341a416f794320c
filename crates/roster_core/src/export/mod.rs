//! Portable snapshot of registry contents.
//!
//! # Responsibility
//! - Serialize the full user list to pretty-printed JSON, losslessly.
//! - Resolve and write the application-owned export file.
//!
//! # Invariants
//! - Every field, including `id` and `created_at`, is written.
//! - Output is readable back by `read_json` and by `SeedSet::from_json_str`.

pub mod json;
