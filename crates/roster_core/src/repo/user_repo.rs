//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search primitives over the `users` table.
//! - Re-classify constraint failures into semantic errors.
//!
//! # Invariants
//! - Listing order is always `created_at DESC, id DESC`.
//! - `delete_user` on a missing id is a no-op that reports `false`.
//! - `replace_all_users` is all-or-nothing: on an aborted seed pass the
//!   previous rows are kept.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::{open_db, open_db_in_memory, register_functions, DbError, DbResult};
use crate::model::user::{validate_fields, NewUser, UserId, UserRecord, UserValidationError};
use crate::seed::dataset::SeedSet;
use crate::seed::loader::{apply_seed, SeedReport};
use chrono::{DateTime, Utc};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::path::Path;
use thiserror::Error;

const USER_SELECT_SQL: &str = "SELECT id, name, email, created_at FROM users";
const USER_ORDER_SQL: &str = "ORDER BY created_at DESC, id DESC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("user not found: {0}")]
    NotFound(UserId),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted user data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw CRUD contract over the user table.
pub trait UserRepository {
    fn count_users(&self) -> RepoResult<u64>;
    fn insert_user(&self, user: &NewUser) -> RepoResult<UserRecord>;
    fn update_user(&self, id: UserId, name: &str, email: &str) -> RepoResult<UserRecord>;
    /// Returns whether a row was actually removed.
    fn delete_user(&self, id: UserId) -> RepoResult<bool>;
    /// Returns the number of removed rows.
    fn delete_all_users(&self) -> RepoResult<u64>;
    /// Deletes every row and runs a seed pass over `seed` atomically.
    ///
    /// Skipped entries do not roll anything back; an aborting storage error
    /// rolls back to the rows present before the call.
    fn replace_all_users(&self, seed: &SeedSet) -> RepoResult<SeedReport>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>>;
    fn list_users(&self) -> RepoResult<Vec<UserRecord>>;
    /// Case-insensitive substring match over name or email.
    fn search_users(&self, term: &str) -> RepoResult<Vec<UserRecord>>;
}

/// SQLite-backed user repository owning its single connection.
pub struct SqliteUserRepository {
    conn: Connection,
}

impl SqliteUserRepository {
    /// Opens the database file at `path`, creating schema as needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-bootstrapped connection.
    ///
    /// Fails when the `users` table is missing, which means the connection
    /// did not come from [`open_db`] / [`open_db_in_memory`]. SQL helper
    /// functions are (re)registered so search works on any such connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'users');",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::InvalidData(
                "connection has no `users` table".to_string(),
            ));
        }
        register_functions(&conn)?;
        Ok(Self { conn })
    }

    fn collect_users(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn require_user(&self, id: UserId) -> RepoResult<UserRecord> {
        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing on read-back")))
    }
}

impl UserRepository for SqliteUserRepository {
    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn insert_user(&self, user: &NewUser) -> RepoResult<UserRecord> {
        user.validate()?;

        let inserted = match user.created_at {
            Some(created_at) => self.conn.execute(
                "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3);",
                params![user.name, user.email, created_at.timestamp_millis()],
            ),
            None => self.conn.execute(
                "INSERT INTO users (name, email) VALUES (?1, ?2);",
                params![user.name, user.email],
            ),
        };
        inserted.map_err(|err| map_write_error(err, &user.email))?;

        self.require_user(self.conn.last_insert_rowid())
    }

    fn update_user(&self, id: UserId, name: &str, email: &str) -> RepoResult<UserRecord> {
        let name = name.trim();
        let email = email.trim();
        validate_fields(name, email)?;

        let changed = self
            .conn
            .execute(
                "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3;",
                params![name, email, id],
            )
            .map_err(|err| map_write_error(err, email))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.require_user(id)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id])?;
        Ok(deleted > 0)
    }

    fn delete_all_users(&self) -> RepoResult<u64> {
        let deleted = self.conn.execute("DELETE FROM users;", [])?;
        Ok(deleted as u64)
    }

    fn replace_all_users(&self, seed: &SeedSet) -> RepoResult<SeedReport> {
        // A failing INSERT only undoes its own statement, so skipped seed
        // entries leave the transaction usable.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM users;", [])?;
        let report = apply_seed(self, seed)?;
        tx.commit()?;
        Ok(report)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<UserRecord>> {
        self.collect_users(&format!("{USER_SELECT_SQL} {USER_ORDER_SQL};"), [])
    }

    fn search_users(&self, term: &str) -> RepoResult<Vec<UserRecord>> {
        let needle = term.trim();
        if needle.is_empty() {
            return self.list_users();
        }

        // instr() keeps `%` and `_` in the term literal, unlike LIKE;
        // casefold() folds non-ASCII letters, unlike lower().
        self.collect_users(
            &format!(
                "{USER_SELECT_SQL}
                 WHERE instr(casefold(name), casefold(?1)) > 0
                    OR instr(casefold(email), casefold(?1)) > 0
                 {USER_ORDER_SQL};"
            ),
            [needle],
        )
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let id: UserId = row.get("id")?;
    let created_at_ms: i64 = row.get("created_at")?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid created_at `{created_at_ms}` in users row {id}"
        ))
    })?;

    Ok(UserRecord {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at,
    })
}

fn map_write_error(err: rusqlite::Error, email: &str) -> RepoError {
    if is_email_unique_violation(&err) {
        return RepoError::DuplicateEmail(email.to_string());
    }
    err.into()
}

fn is_email_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .map_or(true, |msg| msg.contains("users.email"))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteUserRepository, UserRepository};
    use crate::model::user::NewUser;
    use crate::repo::user_repo::RepoError;
    use chrono::{TimeZone, Utc};

    #[test]
    fn pinned_created_at_survives_roundtrip() {
        let repo = SqliteUserRepository::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();
        let created = repo
            .insert_user(&NewUser::new("Anna", "ann@x.com").created_at(at))
            .unwrap();
        assert_eq!(created.created_at, at);
        assert_eq!(repo.get_user(created.id).unwrap().unwrap(), created);
    }

    #[test]
    fn unique_violation_is_reclassified() {
        let repo = SqliteUserRepository::open_in_memory().unwrap();
        repo.insert_user(&NewUser::new("Anna", "ann@x.com")).unwrap();
        let err = repo
            .insert_user(&NewUser::new("Other", "ann@x.com"))
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail(email) if email == "ann@x.com"));
    }

    #[test]
    fn email_uniqueness_is_case_sensitive() {
        let repo = SqliteUserRepository::open_in_memory().unwrap();
        repo.insert_user(&NewUser::new("Anna", "ann@x.com")).unwrap();
        repo.insert_user(&NewUser::new("Anna", "ANN@x.com")).unwrap();
        assert_eq!(repo.count_users().unwrap(), 2);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let repo = SqliteUserRepository::open_in_memory().unwrap();
        repo.insert_user(&NewUser::new("Percent 100%", "pct@x.com"))
            .unwrap();
        repo.insert_user(&NewUser::new("Plain", "plain@x.com")).unwrap();

        let hits = repo.search_users("%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Percent 100%");
    }
}
