//! Seed entry model and dataset sources.
//!
//! The bundled set is parsed once per process and never mutated afterwards.
//! Any JSON array of `{name, email, created_at?}` objects is accepted, which
//! includes the export format (its extra `id` field is ignored).

use crate::model::user::NewUser;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BUNDLED_SEED_JSON: &str = include_str!("../../seed/users.json");

static BUNDLED_SEED: Lazy<SeedSet> = Lazy::new(|| {
    SeedSet::from_json_str(BUNDLED_SEED_JSON).expect("bundled seed data is valid JSON")
});

pub type SeedResult<T> = Result<T, SeedError>;

/// Failure reading or decoding a seed source.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One seed tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SeedEntry {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Converts the entry into an insert request.
    pub fn to_new_user(&self) -> NewUser {
        let user = NewUser::new(&self.name, &self.email);
        match self.created_at {
            Some(created_at) => user.created_at(created_at),
            None => user,
        }
    }
}

/// Ordered, immutable sequence of seed entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    entries: Vec<SeedEntry>,
}

impl SeedSet {
    pub fn new(entries: Vec<SeedEntry>) -> Self {
        Self { entries }
    }

    /// Returns the dataset compiled into the binary.
    pub fn bundled() -> &'static SeedSet {
        &BUNDLED_SEED
    }

    pub fn from_json_str(json: &str) -> SeedResult<Self> {
        let entries: Vec<SeedEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Loads a seed (or export) file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> SeedResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn entries(&self) -> &[SeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
