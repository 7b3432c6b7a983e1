//! Habit repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD + completion-toggle + reorder surface both backends
//!   implement identically.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `sort_order` values of one user's habits form a dense `0..N-1`
//!   sequence after every mutation.
//! - `toggle_completion` is one atomic transition keyed on
//!   `(habit_uuid, date)`; never read-then-write.

use crate::dates::{format_date, parse_date};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::habit::{Habit, HabitDraft, HabitId, HabitPatch, HabitValidationError, UserId};
use crate::model::profile::UserProfile;
use crate::repo::local_store::StoreError;
use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    name,
    icon,
    color_id,
    reminder_enabled,
    reminder_time,
    repeat_days,
    created_at,
    sort_order
FROM habits";

const REQUIRED_TABLES: &[&str] = &["users", "habits", "completions"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for habit persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    Store(StoreError),
    NotFound(HabitId),
    /// Reorder index outside the user's habit count.
    IndexOutOfBounds { index: usize, len: usize },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "reorder index {index} is outside 0..{len}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "habit repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "habit repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage-agnostic habit data-access contract.
///
/// Whichever backend is selected at composition time, callers observe the
/// same results: ordering by `order` ascending, dense renumbering after
/// reorder, idempotent delete, and completion toggles that are their own
/// inverse.
pub trait HabitRepository {
    /// Lists one user's habits ordered by `order` ascending.
    fn list(&self, user_id: UserId) -> RepoResult<Vec<Habit>>;
    /// Gets one habit scoped to its owner.
    fn get(&self, user_id: UserId, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Creates a habit with a generated id, empty completions and
    /// `order = current count`.
    fn create(&mut self, user_id: UserId, draft: HabitDraft) -> RepoResult<Habit>;
    /// Merges only the provided fields into an existing habit.
    fn update(&mut self, user_id: UserId, id: HabitId, patch: HabitPatch) -> RepoResult<Habit>;
    /// Removes a habit and all of its completion records. Deleting an
    /// unknown id is a no-op, not an error.
    fn delete(&mut self, user_id: UserId, id: HabitId) -> RepoResult<()>;
    /// Adds the date to the habit's completions, or removes it when
    /// already present. One atomic transition per call.
    fn toggle_completion(
        &mut self,
        user_id: UserId,
        id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Habit>;
    /// Moves one habit in the display ordering and renumbers the user's
    /// habits to a dense 0-based sequence.
    fn reorder(
        &mut self,
        user_id: UserId,
        from_index: usize,
        to_index: usize,
    ) -> RepoResult<Vec<Habit>>;
    /// Loads the owner's display profile, if one was saved.
    fn load_profile(&self, user_id: UserId) -> RepoResult<Option<UserProfile>>;
    /// Creates or replaces the owner's display profile.
    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match
    ///   the latest migration known by this binary.
    /// - `MissingRequiredTable` when an expected table is absent.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn list(&self, user_id: UserId) -> RepoResult<Vec<Habit>> {
        let mut habits = Vec::new();
        {
            let mut stmt = self.conn.prepare(&format!(
                "{HABIT_SELECT_SQL}
                 WHERE user_uuid = ?1
                 ORDER BY sort_order ASC, uuid ASC;"
            ))?;
            let mut rows = stmt.query([user_id.to_string()])?;
            while let Some(row) = rows.next()? {
                habits.push(parse_habit_row(row)?);
            }
        }

        for habit in &mut habits {
            habit.completions = load_completions(self.conn, habit.id)?;
        }
        Ok(habits)
    }

    fn get(&self, user_id: UserId, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL}
             WHERE uuid = ?1 AND user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;

        if let Some(row) = rows.next()? {
            let mut habit = parse_habit_row(row)?;
            habit.completions = load_completions(self.conn, habit.id)?;
            return Ok(Some(habit));
        }
        Ok(None)
    }

    fn create(&mut self, user_id: UserId, draft: HabitDraft) -> RepoResult<Habit> {
        let mut habit = Habit::new(user_id, draft, 0);
        habit.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let count: u32 = tx.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_uuid = ?1;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        habit.order = count;

        tx.execute(
            "INSERT INTO habits (
                uuid,
                user_uuid,
                name,
                icon,
                color_id,
                reminder_enabled,
                reminder_time,
                repeat_days,
                created_at,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.name.as_str(),
                habit.icon.as_str(),
                habit.color_id.as_str(),
                bool_to_int(habit.reminder_enabled),
                habit.reminder_time.as_deref(),
                repeat_days_to_db(&habit.repeat_days),
                habit.created_at.timestamp_millis(),
                habit.order,
            ],
        )?;
        tx.commit()?;

        Ok(habit)
    }

    fn update(&mut self, user_id: UserId, id: HabitId, patch: HabitPatch) -> RepoResult<Habit> {
        let mut habit = self.get(user_id, id)?.ok_or(RepoError::NotFound(id))?;
        habit.apply_patch(patch);
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                icon = ?2,
                color_id = ?3,
                reminder_enabled = ?4,
                reminder_time = ?5,
                repeat_days = ?6
             WHERE uuid = ?7 AND user_uuid = ?8;",
            params![
                habit.name.as_str(),
                habit.icon.as_str(),
                habit.color_id.as_str(),
                bool_to_int(habit.reminder_enabled),
                habit.reminder_time.as_deref(),
                repeat_days_to_db(&habit.repeat_days),
                id.to_string(),
                user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(habit)
    }

    fn delete(&mut self, user_id: UserId, id: HabitId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Completion rows follow via ON DELETE CASCADE.
        let removed = tx.execute(
            "DELETE FROM habits WHERE uuid = ?1 AND user_uuid = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;

        // Close the ordering gap so sort_order stays a dense 0..N-1
        // sequence and the next create lands at the end.
        if removed > 0 {
            let mut ids: Vec<String> = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "SELECT uuid FROM habits
                     WHERE user_uuid = ?1
                     ORDER BY sort_order ASC, uuid ASC;",
                )?;
                let mut rows = stmt.query([user_id.to_string()])?;
                while let Some(row) = rows.next()? {
                    ids.push(row.get(0)?);
                }
            }
            for (position, uuid) in ids.iter().enumerate() {
                tx.execute(
                    "UPDATE habits SET sort_order = ?1
                     WHERE uuid = ?2 AND sort_order <> ?1;",
                    params![position as u32, uuid.as_str()],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn toggle_completion(
        &mut self,
        user_id: UserId,
        id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Habit> {
        let date_text = format_date(date);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owned: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM habits WHERE uuid = ?1 AND user_uuid = ?2;",
                params![id.to_string(), user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Err(RepoError::NotFound(id));
        }

        let removed = tx.execute(
            "DELETE FROM completions WHERE habit_uuid = ?1 AND date = ?2;",
            params![id.to_string(), date_text.as_str()],
        )?;
        if removed == 0 {
            tx.execute(
                "INSERT OR IGNORE INTO completions (habit_uuid, user_uuid, date)
                 VALUES (?1, ?2, ?3);",
                params![id.to_string(), user_id.to_string(), date_text.as_str()],
            )?;
        }
        tx.commit()?;

        self.get(user_id, id)?.ok_or_else(|| {
            RepoError::InvalidData("toggled habit missing on read-back".to_string())
        })
    }

    fn reorder(
        &mut self,
        user_id: UserId,
        from_index: usize,
        to_index: usize,
    ) -> RepoResult<Vec<Habit>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut ids: Vec<String> = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT uuid FROM habits
                 WHERE user_uuid = ?1
                 ORDER BY sort_order ASC, uuid ASC;",
            )?;
            let mut rows = stmt.query([user_id.to_string()])?;
            while let Some(row) = rows.next()? {
                ids.push(row.get(0)?);
            }
        }

        let len = ids.len();
        if from_index >= len {
            return Err(RepoError::IndexOutOfBounds {
                index: from_index,
                len,
            });
        }
        if to_index >= len {
            return Err(RepoError::IndexOutOfBounds {
                index: to_index,
                len,
            });
        }

        let moved = ids.remove(from_index);
        ids.insert(to_index, moved);

        for (position, uuid) in ids.iter().enumerate() {
            // Touches only rows whose position actually changed.
            tx.execute(
                "UPDATE habits SET sort_order = ?1
                 WHERE uuid = ?2 AND sort_order <> ?1;",
                params![position as u32, uuid.as_str()],
            )?;
        }
        tx.commit()?;

        self.list(user_id)
    }

    fn load_profile(&self, user_id: UserId) -> RepoResult<Option<UserProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, age, email FROM users WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;

        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            return Ok(Some(UserProfile {
                user_id: parse_uuid(&uuid_text, "users.uuid")?,
                name: row.get("name")?,
                age: row.get("age")?,
                email: row.get("email")?,
            }));
        }
        Ok(None)
    }

    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (uuid, name, age, email)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (uuid) DO UPDATE SET
                name = excluded.name,
                age = excluded.age,
                email = excluded.email,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                profile.user_id.to_string(),
                profile.name.as_str(),
                profile.age,
                profile.email.as_str(),
            ],
        )?;
        Ok(())
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;

    let reminder_enabled = match row.get::<_, i64>("reminder_enabled")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid reminder_enabled value `{other}` in habits.reminder_enabled"
            )));
        }
    };

    let repeat_text: String = row.get("repeat_days")?;
    let created_ms: i64 = row.get("created_at")?;
    let created_at = Utc
        .timestamp_millis_opt(created_ms)
        .single()
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid created_at value `{created_ms}` in habits.created_at"
            ))
        })?;

    Ok(Habit {
        id: parse_uuid(&uuid_text, "habits.uuid")?,
        user_id: parse_uuid(&user_text, "habits.user_uuid")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color_id: row.get("color_id")?,
        reminder_enabled,
        reminder_time: row.get("reminder_time")?,
        repeat_days: parse_repeat_days(&repeat_text)?,
        completions: BTreeSet::new(),
        created_at,
        order: row.get("sort_order")?,
    })
}

fn load_completions(conn: &Connection, habit_id: HabitId) -> RepoResult<BTreeSet<NaiveDate>> {
    let mut stmt =
        conn.prepare("SELECT date FROM completions WHERE habit_uuid = ?1;")?;
    let mut rows = stmt.query([habit_id.to_string()])?;

    let mut completions = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let date_text: String = row.get(0)?;
        let date = parse_date(&date_text).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date value `{date_text}` in completions.date"
            ))
        })?;
        completions.insert(date);
    }
    Ok(completions)
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn repeat_days_to_db(days: &BTreeSet<u8>) -> String {
    days.iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_repeat_days(value: &str) -> RepoResult<BTreeSet<u8>> {
    let mut days = BTreeSet::new();
    for part in value.split(',').filter(|part| !part.is_empty()) {
        let day: u8 = part.parse().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid repeat day `{part}` in habits.repeat_days"
            ))
        })?;
        if day > 6 {
            return Err(RepoError::InvalidData(format!(
                "repeat day `{day}` outside 0..=6 in habits.repeat_days"
            )));
        }
        days.insert(day);
    }
    Ok(days)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
