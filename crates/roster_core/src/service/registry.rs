//! Seed-then-sync lifecycle controller.
//!
//! # Responsibility
//! - Seed an empty store exactly once at startup.
//! - Expose CRUD, search, reset and export once the store is ready.
//! - Keep the authoritative in-memory view in step with every mutation.
//!
//! # Invariants
//! - States move `Uninitialized -> Seeding -> Ready` and
//!   `Ready -> Resetting -> Ready`; nothing else.
//! - CRUD is only served in `Ready`.
//! - `initialize()` in `Ready` is a no-op; during `Seeding`/`Resetting` it is
//!   rejected, so two seed passes never overlap.
//! - A failed seed/reset pass drops back to `Uninitialized`. Reset and import
//!   replace rows atomically, so a failed pass leaves the pre-reset rows.

use crate::config::CoreConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::export::json::{export_to_dir, write_json};
use crate::model::user::{validate_fields, NewUser, UserId, UserRecord};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::search::filter::find_users;
use crate::seed::dataset::SeedSet;
use crate::seed::loader::{apply_seed, SeedReport};
use log::{debug, info, warn};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;

/// Lifecycle state of a [`UserRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Seeding,
    Ready,
    Resetting,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Seeding => "seeding",
            Self::Ready => "ready",
            Self::Resetting => "resetting",
        };
        f.write_str(label)
    }
}

/// What `initialize()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    /// `true` only when this call ran the first-run seed pass.
    pub seeded: bool,
    pub seed_report: Option<SeedReport>,
    pub user_count: usize,
}

/// Lifecycle controller owning the record store.
pub struct UserRegistry<R: UserRepository> {
    repo: R,
    seed: SeedSet,
    export_dir: PathBuf,
    state: LifecycleState,
    users: Vec<UserRecord>,
    last_seed_report: Option<SeedReport>,
}

impl UserRegistry<SqliteUserRepository> {
    /// Opens the on-disk store described by `config` with the bundled seed.
    ///
    /// The registry still has to be initialized.
    pub fn open(config: &CoreConfig) -> RegistryResult<Self> {
        let repo = SqliteUserRepository::open(config.db_path())?;
        Ok(Self::new(repo, SeedSet::bundled().clone(), config.export_dir()))
    }
}

impl<R: UserRepository> UserRegistry<R> {
    pub fn new(repo: R, seed: SeedSet, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            seed,
            export_dir: export_dir.into(),
            state: LifecycleState::Uninitialized,
            users: Vec::new(),
            last_seed_report: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Snapshot taken after the most recent initialization or mutation.
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn last_seed_report(&self) -> Option<&SeedReport> {
        self.last_seed_report.as_ref()
    }

    pub fn seed(&self) -> &SeedSet {
        &self.seed
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Brings the registry to `Ready`, seeding first if the store is empty.
    pub fn initialize(&mut self) -> RegistryResult<InitOutcome> {
        match self.state {
            LifecycleState::Ready => {
                debug!("event=registry_init module=service status=noop");
                return Ok(InitOutcome {
                    seeded: false,
                    seed_report: None,
                    user_count: self.users.len(),
                });
            }
            LifecycleState::Seeding | LifecycleState::Resetting => {
                return Err(RegistryError::Busy(self.state));
            }
            LifecycleState::Uninitialized => {}
        }

        let result = self.first_run();
        if result.is_err() {
            self.transition(LifecycleState::Uninitialized);
        }
        result
    }

    fn first_run(&mut self) -> RegistryResult<InitOutcome> {
        let existing = self.repo.count_users()?;
        let seed_report = if existing == 0 {
            self.transition(LifecycleState::Seeding);
            let report = apply_seed(&self.repo, &self.seed)?;
            self.last_seed_report = Some(report.clone());
            Some(report)
        } else {
            None
        };

        self.reload()?;
        self.transition(LifecycleState::Ready);
        info!(
            "event=registry_init module=service status=ok seeded={} users={}",
            seed_report.is_some(),
            self.users.len()
        );

        Ok(InitOutcome {
            seeded: seed_report.is_some(),
            seed_report,
            user_count: self.users.len(),
        })
    }

    pub fn count(&self) -> RegistryResult<u64> {
        self.ensure_ready()?;
        Ok(self.repo.count_users()?)
    }

    /// Fresh newest-first listing straight from the store.
    pub fn list_all(&self) -> RegistryResult<Vec<UserRecord>> {
        self.ensure_ready()?;
        Ok(self.repo.list_users()?)
    }

    /// Case-insensitive name/email search; a blank term lists everything.
    pub fn search(&self, term: &str) -> RegistryResult<Vec<UserRecord>> {
        self.ensure_ready()?;
        Ok(find_users(&self.repo, term)?)
    }

    pub fn get(&self, id: UserId) -> RegistryResult<UserRecord> {
        self.ensure_ready()?;
        self.repo.get_user(id)?.ok_or(RegistryError::NotFound(id))
    }

    pub fn add(&mut self, name: &str, email: &str) -> RegistryResult<UserRecord> {
        self.ensure_ready()?;
        let user = NewUser::new(name, email);
        user.validate()?;

        let created = self.repo.insert_user(&user)?;
        self.reload()?;
        Ok(created)
    }

    /// Replaces name and email; `id` and `created_at` stay as they were.
    pub fn update(&mut self, id: UserId, name: &str, email: &str) -> RegistryResult<UserRecord> {
        self.ensure_ready()?;
        validate_fields(name.trim(), email.trim())?;

        let updated = self.repo.update_user(id, name, email)?;
        self.reload()?;
        Ok(updated)
    }

    /// Deletes one user. Deleting an unknown id is a no-op returning `false`.
    pub fn delete(&mut self, id: UserId) -> RegistryResult<bool> {
        self.ensure_ready()?;
        let removed = self.repo.delete_user(id)?;
        if !removed {
            debug!("event=user_delete module=service status=noop id={}", id);
        }
        self.reload()?;
        Ok(removed)
    }

    /// Removes every user without reseeding.
    pub fn clear_all(&mut self) -> RegistryResult<u64> {
        self.ensure_ready()?;
        let removed = self.repo.delete_all_users()?;
        info!(
            "event=registry_clear module=service status=ok removed={}",
            removed
        );
        self.reload()?;
        Ok(removed)
    }

    /// Discards all users and restores the bundled seed set.
    pub fn reset(&mut self) -> RegistryResult<SeedReport> {
        let seed = self.seed.clone();
        self.replace_with(&seed, "reset")
    }

    /// Discards all users and seeds from `seed` instead of the bundled set.
    ///
    /// Accepts an export file's contents, so a snapshot can be restored.
    pub fn import(&mut self, seed: &SeedSet) -> RegistryResult<SeedReport> {
        self.replace_with(seed, "import")
    }

    fn replace_with(&mut self, seed: &SeedSet, reason: &str) -> RegistryResult<SeedReport> {
        self.ensure_ready()?;
        self.transition(LifecycleState::Resetting);

        let result = self.reseed(seed);
        match &result {
            Ok(report) => {
                self.transition(LifecycleState::Ready);
                info!(
                    "event=registry_{} module=service status=ok inserted={} skipped={}",
                    reason,
                    report.inserted_count(),
                    report.skipped_count()
                );
            }
            Err(err) => {
                warn!(
                    "event=registry_{} module=service status=error error={}",
                    reason, err
                );
                self.transition(LifecycleState::Uninitialized);
            }
        }
        result
    }

    fn reseed(&mut self, seed: &SeedSet) -> RegistryResult<SeedReport> {
        let report = self.repo.replace_all_users(seed)?;
        self.last_seed_report = Some(report.clone());
        self.reload()?;
        Ok(report)
    }

    /// Writes a fresh snapshot into the export directory and returns its path.
    pub fn export(&self) -> RegistryResult<PathBuf> {
        self.ensure_ready()?;
        let users = self.repo.list_users()?;
        Ok(export_to_dir(&users, &self.export_dir)?)
    }

    /// Writes a fresh snapshot to a caller-provided sink.
    pub fn export_to<W: Write>(&self, sink: W) -> RegistryResult<()> {
        self.ensure_ready()?;
        let users = self.repo.list_users()?;
        Ok(write_json(&users, sink)?)
    }

    fn ensure_ready(&self) -> RegistryResult<()> {
        if self.state == LifecycleState::Ready {
            Ok(())
        } else {
            Err(RegistryError::NotReady(self.state))
        }
    }

    fn reload(&mut self) -> RegistryResult<()> {
        self.users = self.repo.list_users()?;
        Ok(())
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(
            "event=lifecycle_transition module=service from={} to={}",
            self.state, next
        );
        self.state = next;
    }
}
