//! Stateless search façade over a `UserRepository`.
//!
//! # Invariants
//! - A blank term returns exactly `list_users()`.
//! - Matching is a case-insensitive substring test over name or email.
//! - Results are never cached.

use crate::model::user::UserRecord;
use crate::repo::user_repo::{RepoResult, UserRepository};

/// Normalized search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(Option<String>);

impl SearchTerm {
    /// Trims the raw input; whitespace-only input becomes the "match all" term.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_match_all(&self) -> bool {
        self.0.is_none()
    }
}

/// Returns users matching `term`, newest first.
pub fn find_users<R: UserRepository + ?Sized>(
    repo: &R,
    term: &str,
) -> RepoResult<Vec<UserRecord>> {
    match SearchTerm::parse(term).as_str() {
        None => repo.list_users(),
        Some(needle) => repo.search_users(needle),
    }
}
