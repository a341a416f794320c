//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, seed and export calls into the operations the
//!   presentation layer consumes.
//! - Keep callers decoupled from storage details.

pub mod registry;
