use chrono::NaiveDate;
use habitkit_core::db::open_db_in_memory;
use habitkit_core::{
    HabitDraft, HabitPatch, HabitRepository, RepoError, SqliteHabitRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn draft(name: &str) -> HabitDraft {
    HabitDraft {
        name: name.to_string(),
        icon: "mdi:book-open-page-variant".to_string(),
        color_id: "burgundy".to_string(),
        reminder_enabled: false,
        reminder_time: None,
        repeat_days: BTreeSet::from([0, 1, 2, 3, 4, 5, 6]),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let created = repo.create(user, draft("Reading")).unwrap();
    assert_eq!(created.order, 0);
    assert!(created.completions.is_empty());

    let loaded = repo.get(user, created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_assigns_sequential_order_per_user() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let first = repo.create(user_a, draft("Reading")).unwrap();
    let second = repo.create(user_a, draft("Running")).unwrap();
    let other = repo.create(user_b, draft("Water")).unwrap();

    assert_eq!(first.order, 0);
    assert_eq!(second.order, 1);
    assert_eq!(other.order, 0);
}

#[test]
fn create_rejects_empty_name_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let err = repo.create(user, draft("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list(user).unwrap().is_empty());
}

#[test]
fn update_merges_partial_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let created = repo.create(user, draft("Reading")).unwrap();
    let updated = repo
        .update(
            user,
            created.id,
            HabitPatch {
                name: Some("Evening reading".to_string()),
                repeat_days: Some(BTreeSet::from([2, 4])),
                ..HabitPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Evening reading");
    assert_eq!(updated.repeat_days, BTreeSet::from([2, 4]));
    assert_eq!(updated.icon, created.icon);
    assert_eq!(updated.created_at, created.created_at);

    let loaded = repo.get(user, created.id).unwrap().unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_unknown_id_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();
    let missing = Uuid::new_v4();

    let err = repo
        .update(user, missing, HabitPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn update_is_scoped_to_the_owning_user() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let created = repo.create(owner, draft("Reading")).unwrap();
    let err = repo
        .update(intruder, created.id, HabitPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn delete_is_idempotent_and_removes_completions() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let habit = repo.create(user, draft("Reading")).unwrap();
    repo.toggle_completion(user, habit.id, date(2024, 5, 1))
        .unwrap();

    repo.delete(user, habit.id).unwrap();
    repo.delete(user, habit.id).unwrap();
    repo.delete(user, Uuid::new_v4()).unwrap();

    assert!(repo.get(user, habit.id).unwrap().is_none());
    drop(repo);

    let orphaned: i64 = conn
        .query_row("SELECT COUNT(*) FROM completions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn delete_renumbers_remaining_order_densely() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let _first = repo.create(user, draft("Reading")).unwrap();
    let second = repo.create(user, draft("Running")).unwrap();
    let _third = repo.create(user, draft("Water")).unwrap();

    repo.delete(user, second.id).unwrap();

    let remaining = repo.list(user).unwrap();
    let orders: Vec<u32> = remaining.iter().map(|habit| habit.order).collect();
    assert_eq!(orders, vec![0, 1]);

    // The next create lands at the end without colliding.
    let appended = repo.create(user, draft("Sleep")).unwrap();
    assert_eq!(appended.order, 2);
}

#[test]
fn toggle_completion_is_its_own_inverse() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();
    let day = date(2024, 5, 6);

    let habit = repo.create(user, draft("Reading")).unwrap();

    let toggled = repo.toggle_completion(user, habit.id, day).unwrap();
    assert!(toggled.is_completed_on(day));

    let restored = repo.toggle_completion(user, habit.id, day).unwrap();
    assert!(!restored.is_completed_on(day));
    assert_eq!(restored.completions, habit.completions);
}

#[test]
fn toggle_completion_unknown_habit_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();
    let missing = Uuid::new_v4();

    let err = repo
        .toggle_completion(user, missing, date(2024, 5, 6))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn list_orders_by_display_position() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let first = repo.create(user, draft("Reading")).unwrap();
    let second = repo.create(user, draft("Running")).unwrap();
    let third = repo.create(user, draft("Water")).unwrap();

    let listed = repo.list(user).unwrap();
    let ids: Vec<_> = listed.iter().map(|habit| habit.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn reorder_renumbers_to_dense_sequence() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    let first = repo.create(user, draft("Reading")).unwrap();
    let second = repo.create(user, draft("Running")).unwrap();
    let third = repo.create(user, draft("Water")).unwrap();

    let reordered = repo.reorder(user, 0, 2).unwrap();
    let ids: Vec<_> = reordered.iter().map(|habit| habit.id).collect();
    assert_eq!(ids, vec![second.id, third.id, first.id]);
    let orders: Vec<u32> = reordered.iter().map(|habit| habit.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn reorder_rejects_out_of_bounds_indices() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    repo.create(user, draft("Reading")).unwrap();

    let err = repo.reorder(user, 0, 3).unwrap_err();
    assert!(matches!(
        err,
        RepoError::IndexOutOfBounds { index: 3, len: 1 }
    ));
}

#[test]
fn profile_roundtrip_and_replace() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteHabitRepository::try_new(&mut conn).unwrap();
    let user = Uuid::new_v4();

    assert!(repo.load_profile(user).unwrap().is_none());

    let profile = habitkit_core::UserProfile {
        user_id: user,
        name: "Ada".to_string(),
        age: 36,
        email: "ada@example.com".to_string(),
    };
    repo.save_profile(&profile).unwrap();
    assert_eq!(repo.load_profile(user).unwrap().unwrap(), profile);

    let renamed = habitkit_core::UserProfile {
        name: "Ada L.".to_string(),
        ..profile.clone()
    };
    repo.save_profile(&renamed).unwrap();
    assert_eq!(repo.load_profile(user).unwrap().unwrap(), renamed);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    match SqliteHabitRepository::try_new(&mut conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => {
            assert!(expected_version > 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("uninitialized connection must be rejected"),
    }
}
