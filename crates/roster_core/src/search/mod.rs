//! Free-text lookup over registry users.
//!
//! # Responsibility
//! - Turn a user-typed term into a filtered, newest-first list.
//! - Hold no state: every call goes back to the store.

pub mod filter;
