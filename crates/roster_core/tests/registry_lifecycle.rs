use chrono::{TimeZone, Utc};
use roster_core::db::open_db_in_memory;
use roster_core::{
    CoreConfig, LifecycleState, NewUser, RegistryError, SeedEntry, SeedOutcome, SeedSet,
    SqliteUserRepository, UserRegistry, UserRepository,
};
use std::collections::BTreeSet;

fn three_user_seed() -> SeedSet {
    SeedSet::new(vec![
        SeedEntry::new("Ada", "ada@x.com")
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
        SeedEntry::new("Alan", "alan@x.com")
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()),
        SeedEntry::new("Grace", "grace@x.com")
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap()),
    ])
}

fn registry(seed: SeedSet) -> UserRegistry<SqliteUserRepository> {
    let repo = SqliteUserRepository::open_in_memory().unwrap();
    UserRegistry::new(repo, seed, std::env::temp_dir().join("roster-unused-exports"))
}

fn pairs(users: &[roster_core::UserRecord]) -> BTreeSet<(String, String)> {
    users
        .iter()
        .map(|u| (u.name.clone(), u.email.clone()))
        .collect()
}

#[test]
fn first_run_seeds_empty_store_newest_first() {
    let mut registry = registry(three_user_seed());
    assert_eq!(registry.state(), LifecycleState::Uninitialized);

    let outcome = registry.initialize().unwrap();
    assert!(outcome.seeded);
    assert_eq!(outcome.user_count, 3);
    assert_eq!(outcome.seed_report.unwrap().inserted_count(), 3);
    assert_eq!(registry.state(), LifecycleState::Ready);
    assert_eq!(registry.count().unwrap(), 3);

    let names: Vec<_> = registry
        .list_all()
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Grace", "Alan", "Ada"]);
    assert_eq!(registry.users(), registry.list_all().unwrap().as_slice());
}

#[test]
fn second_initialize_is_a_noop() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();
    registry.add("Anna", "ann@x.com").unwrap();

    let again = registry.initialize().unwrap();
    assert!(!again.seeded);
    assert!(again.seed_report.is_none());
    assert_eq!(registry.count().unwrap(), 4);
}

#[test]
fn crud_is_rejected_before_initialize() {
    let mut registry = registry(three_user_seed());
    assert!(matches!(
        registry.add("Anna", "ann@x.com"),
        Err(RegistryError::NotReady(LifecycleState::Uninitialized))
    ));
    assert!(matches!(
        registry.list_all(),
        Err(RegistryError::NotReady(_))
    ));
    assert!(matches!(registry.reset(), Err(RegistryError::NotReady(_))));
}

#[test]
fn seeding_is_best_effort_and_reported() {
    let seed = SeedSet::new(vec![
        SeedEntry::new("Ada", "ada@x.com"),
        SeedEntry::new("Ada Again", "ada@x.com"),
        SeedEntry::new("", "blank@x.com"),
        SeedEntry::new("Grace", "grace@x.com"),
    ]);
    let mut registry = registry(seed);

    let report = registry.initialize().unwrap().seed_report.unwrap();
    assert_eq!(report.inserted_count(), 2);
    let skipped: Vec<_> = report
        .skipped()
        .map(|outcome| match outcome {
            SeedOutcome::Skipped { index, .. } => *index,
            SeedOutcome::Inserted { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(skipped, vec![1, 2]);
    assert_eq!(registry.last_seed_report(), Some(&report));
    assert_eq!(registry.count().unwrap(), 2);
}

#[test]
fn add_update_delete_refresh_the_view() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();

    let anna = registry.add("Anna", "ann@x.com").unwrap();
    assert!(registry.users().iter().any(|u| u.id == anna.id));

    let edited = registry.update(anna.id, "Anna B", "annb@x.com").unwrap();
    assert_eq!(edited.created_at, anna.created_at);
    let in_view = registry.users().iter().find(|u| u.id == anna.id).unwrap();
    assert_eq!(in_view.email, "annb@x.com");

    assert!(registry.delete(anna.id).unwrap());
    assert!(registry.users().iter().all(|u| u.id != anna.id));
    assert!(!registry.delete(anna.id).unwrap());
    assert!(matches!(
        registry.get(anna.id),
        Err(RegistryError::NotFound(id)) if id == anna.id
    ));
}

#[test]
fn duplicate_add_fails_and_keeps_count() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();

    registry.add("Anna", "ann@x.com").unwrap();
    let before = registry.count().unwrap();
    let err = registry.add("Anna", "ann@x.com").unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateEmail(email) if email == "ann@x.com"));
    assert_eq!(registry.count().unwrap(), before);
}

#[test]
fn validation_errors_surface_before_store() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();

    assert!(matches!(
        registry.add("  ", "ann@x.com"),
        Err(RegistryError::Validation(_))
    ));
    assert!(matches!(
        registry.update(1, "Ada", "broken"),
        Err(RegistryError::Validation(_))
    ));
    assert!(matches!(
        registry.update(9_999, "Ghost", "ghost@x.com"),
        Err(RegistryError::NotFound(9_999))
    ));
}

#[test]
fn clear_all_empties_without_reseeding() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();

    assert_eq!(registry.clear_all().unwrap(), 3);
    assert!(registry.users().is_empty());
    assert_eq!(registry.count().unwrap(), 0);

    let again = registry.initialize().unwrap();
    assert!(!again.seeded);
    assert_eq!(registry.count().unwrap(), 0);
}

#[test]
fn reset_restores_exactly_the_seed_set() {
    let seed = three_user_seed();
    let mut registry = registry(seed.clone());
    registry.initialize().unwrap();
    registry.clear_all().unwrap();
    for i in 0..5 {
        registry
            .add(&format!("User {i}"), &format!("user{i}@x.com"))
            .unwrap();
    }
    assert_eq!(registry.count().unwrap(), 5);

    let report = registry.reset().unwrap();
    assert!(report.is_complete());
    assert_eq!(registry.state(), LifecycleState::Ready);

    let expected: BTreeSet<_> = seed
        .entries()
        .iter()
        .map(|e| (e.name.clone(), e.email.clone()))
        .collect();
    assert_eq!(pairs(&registry.list_all().unwrap()), expected);
    assert_eq!(pairs(registry.users()), expected);
}

#[test]
fn import_replaces_contents_and_reset_returns_to_bundled_seed() {
    let mut registry = registry(three_user_seed());
    registry.initialize().unwrap();

    let snapshot = SeedSet::new(vec![SeedEntry::new("Solo", "solo@x.com")]);
    registry.import(&snapshot).unwrap();
    assert_eq!(registry.count().unwrap(), 1);

    registry.reset().unwrap();
    assert_eq!(registry.count().unwrap(), 3);
}

#[test]
fn existing_store_is_not_reseeded_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::with_data_dir(dir.path());

    {
        let mut registry = UserRegistry::open(&config).unwrap();
        assert!(registry.initialize().unwrap().seeded);
        registry.add("Anna", "ann@x.com").unwrap();
    }

    let mut registry = UserRegistry::open(&config).unwrap();
    let outcome = registry.initialize().unwrap();
    assert!(!outcome.seeded);
    assert_eq!(
        outcome.user_count,
        SeedSet::bundled().len() + 1,
        "user edits must survive a restart"
    );
    assert_eq!(registry.search("ann@x").unwrap().len(), 1);
}

#[test]
fn unopenable_store_is_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();

    let err = UserRegistry::open(&CoreConfig::with_data_dir(&blocker)).err().unwrap();
    assert!(matches!(err, RegistryError::StoreUnavailable(_)), "{err}");
}

#[test]
fn failed_reset_keeps_previous_rows_and_recovers() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_blocked BEFORE INSERT ON users
         WHEN NEW.email = 'blocked@x.com'
         BEGIN SELECT RAISE(ABORT, 'storage rejected row'); END;",
    )
    .unwrap();
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.insert_user(&NewUser::new("Bob", "bob@x.com")).unwrap();
    repo.insert_user(&NewUser::new("Anna", "ann@x.com")).unwrap();

    let seed = SeedSet::new(vec![
        SeedEntry::new("Ada", "ada@x.com"),
        SeedEntry::new("Blocked", "blocked@x.com"),
    ]);
    let mut registry = UserRegistry::new(
        repo,
        seed,
        std::env::temp_dir().join("roster-unused-exports"),
    );
    assert!(!registry.initialize().unwrap().seeded);
    let before = pairs(registry.users());

    let err = registry.reset().unwrap_err();
    assert!(matches!(err, RegistryError::StoreUnavailable(_)), "{err}");
    assert_eq!(registry.state(), LifecycleState::Uninitialized);
    assert_eq!(pairs(&registry.repository().list_users().unwrap()), before);

    let outcome = registry.initialize().unwrap();
    assert!(!outcome.seeded);
    assert_eq!(registry.state(), LifecycleState::Ready);
    assert_eq!(pairs(registry.users()), before);
}
