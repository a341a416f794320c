//! Best-effort seeding pass.
//!
//! # Invariants
//! - Each entry yields exactly one `SeedOutcome`, in sequence order.
//! - Validation and duplicate-email failures are skipped and reported.
//! - Any other storage failure aborts the pass; the store is unusable then.

use crate::model::user::UserId;
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};
use crate::seed::dataset::SeedSet;
use log::{info, warn};

/// Result of attempting one seed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted { index: usize, id: UserId },
    Skipped {
        index: usize,
        email: String,
        reason: String,
    },
}

/// Per-entry report of a seeding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub outcomes: Vec<SeedOutcome>,
}

impl SeedReport {
    pub fn inserted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SeedOutcome::Inserted { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SeedOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SeedOutcome::Skipped { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped_count() == 0
    }
}

/// Inserts every seed entry in order through `repo`.
pub fn apply_seed<R: UserRepository + ?Sized>(
    repo: &R,
    seed: &SeedSet,
) -> RepoResult<SeedReport> {
    let mut report = SeedReport::default();

    for (index, entry) in seed.entries().iter().enumerate() {
        match repo.insert_user(&entry.to_new_user()) {
            Ok(user) => report.outcomes.push(SeedOutcome::Inserted { index, id: user.id }),
            Err(err @ (RepoError::Validation(_) | RepoError::DuplicateEmail(_))) => {
                warn!(
                    "event=seed_skip module=seed status=skipped index={} email={} reason={}",
                    index, entry.email, err
                );
                report.outcomes.push(SeedOutcome::Skipped {
                    index,
                    email: entry.email.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "event=seed_apply module=seed status=ok total={} inserted={} skipped={}",
        seed.len(),
        report.inserted_count(),
        report.skipped_count()
    );
    Ok(report)
}
