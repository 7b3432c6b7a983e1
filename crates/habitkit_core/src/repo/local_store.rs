//! Local-device habit repository backed by one JSON snapshot file.
//!
//! # Responsibility
//! - Implement the habit repository contract over an in-memory collection
//!   persisted wholesale on every mutation.
//!
//! # Invariants
//! - Mutations are applied to a working copy and committed to memory only
//!   after the snapshot write succeeds; a failed write never leaves the
//!   in-memory view ahead of disk.
//! - A missing snapshot file loads as an empty store; an unreadable or
//!   corrupt snapshot loads as empty with a warning instead of failing
//!   the whole session.

use crate::model::habit::{Habit, HabitDraft, HabitId, HabitPatch, UserId};
use crate::model::profile::UserProfile;
use crate::repo::habit_repo::{HabitRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SNAPSHOT_FILE_NAME: &str = "habits.json";

/// Errors from snapshot file handling.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure for the given path.
    Io(PathBuf, io::Error),
    /// Snapshot could not be serialized.
    Serialize(serde_json::Error),
    /// No platform data directory is available for the default location.
    MissingDataDir,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "snapshot I/O failed at `{}`: {err}", path.display()),
            Self::Serialize(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::MissingDataDir => write!(f, "no platform data directory available"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::MissingDataDir => None,
        }
    }
}

/// On-disk snapshot shape: the full collection for every local user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HabitStore {
    #[serde(default)]
    profiles: Vec<UserProfile>,
    #[serde(default)]
    habits: Vec<Habit>,
}

/// Habit repository persisting to a local JSON snapshot.
pub struct LocalStoreHabitRepository {
    path: PathBuf,
    store: HabitStore,
}

impl LocalStoreHabitRepository {
    /// Opens a repository over the given snapshot path.
    ///
    /// Loading is lenient: missing or corrupt snapshots start empty, so a
    /// damaged file degrades to last-known/empty state instead of an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = load_snapshot(&path);
        Self { path, store }
    }

    /// Opens a repository at the platform-default data location.
    pub fn open_default() -> RepoResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or(StoreError::MissingDataDir)?
            .join("habitkit");
        fs::create_dir_all(&data_dir)
            .map_err(|err| StoreError::Io(data_dir.clone(), err))?;
        Ok(Self::open(data_dir.join(SNAPSHOT_FILE_NAME)))
    }

    /// Returns the snapshot path this repository persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the working copy to disk, then commits it to memory.
    fn commit(&mut self, next: HabitStore) -> RepoResult<()> {
        let json = serde_json::to_vec_pretty(&next).map_err(StoreError::Serialize)?;
        fs::write(&self.path, json)
            .map_err(|err| StoreError::Io(self.path.clone(), err))?;
        self.store = next;
        Ok(())
    }

    fn sorted_user_habits(&self, user_id: UserId) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self
            .store
            .habits
            .iter()
            .filter(|habit| habit.user_id == user_id)
            .cloned()
            .collect();
        habits.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        habits
    }
}

impl HabitRepository for LocalStoreHabitRepository {
    fn list(&self, user_id: UserId) -> RepoResult<Vec<Habit>> {
        Ok(self.sorted_user_habits(user_id))
    }

    fn get(&self, user_id: UserId, id: HabitId) -> RepoResult<Option<Habit>> {
        Ok(self
            .store
            .habits
            .iter()
            .find(|habit| habit.id == id && habit.user_id == user_id)
            .cloned())
    }

    fn create(&mut self, user_id: UserId, draft: HabitDraft) -> RepoResult<Habit> {
        let count = self
            .store
            .habits
            .iter()
            .filter(|habit| habit.user_id == user_id)
            .count() as u32;
        let habit = Habit::new(user_id, draft, count);
        habit.validate()?;

        let mut next = self.store.clone();
        next.habits.push(habit.clone());
        self.commit(next)?;
        Ok(habit)
    }

    fn update(&mut self, user_id: UserId, id: HabitId, patch: HabitPatch) -> RepoResult<Habit> {
        let mut next = self.store.clone();
        let habit = next
            .habits
            .iter_mut()
            .find(|habit| habit.id == id && habit.user_id == user_id)
            .ok_or(RepoError::NotFound(id))?;
        habit.apply_patch(patch);
        habit.validate()?;
        let updated = habit.clone();

        self.commit(next)?;
        Ok(updated)
    }

    fn delete(&mut self, user_id: UserId, id: HabitId) -> RepoResult<()> {
        let mut next = self.store.clone();
        let before = next.habits.len();
        next.habits
            .retain(|habit| !(habit.id == id && habit.user_id == user_id));

        // Unknown ids are a no-op success; nothing changed, nothing to write.
        if next.habits.len() == before {
            return Ok(());
        }

        // Close the ordering gap so order stays a dense 0..N-1 sequence.
        let mut remaining: Vec<&mut Habit> = next
            .habits
            .iter_mut()
            .filter(|habit| habit.user_id == user_id)
            .collect();
        remaining.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        for (position, habit) in remaining.iter_mut().enumerate() {
            habit.order = position as u32;
        }
        self.commit(next)
    }

    fn toggle_completion(
        &mut self,
        user_id: UserId,
        id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Habit> {
        let mut next = self.store.clone();
        let habit = next
            .habits
            .iter_mut()
            .find(|habit| habit.id == id && habit.user_id == user_id)
            .ok_or(RepoError::NotFound(id))?;

        if !habit.completions.remove(&date) {
            habit.completions.insert(date);
        }
        let toggled = habit.clone();

        self.commit(next)?;
        Ok(toggled)
    }

    fn reorder(
        &mut self,
        user_id: UserId,
        from_index: usize,
        to_index: usize,
    ) -> RepoResult<Vec<Habit>> {
        let mut ordered: Vec<HabitId> = self
            .sorted_user_habits(user_id)
            .iter()
            .map(|habit| habit.id)
            .collect();

        let len = ordered.len();
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

        let moved = ordered.remove(from_index);
        ordered.insert(to_index, moved);

        let mut next = self.store.clone();
        for habit in next
            .habits
            .iter_mut()
            .filter(|habit| habit.user_id == user_id)
        {
            if let Some(position) = ordered.iter().position(|id| *id == habit.id) {
                habit.order = position as u32;
            }
        }
        self.commit(next)?;

        self.list(user_id)
    }

    fn load_profile(&self, user_id: UserId) -> RepoResult<Option<UserProfile>> {
        Ok(self
            .store
            .profiles
            .iter()
            .find(|profile| profile.user_id == user_id)
            .cloned())
    }

    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        let mut next = self.store.clone();
        match next
            .profiles
            .iter_mut()
            .find(|existing| existing.user_id == profile.user_id)
        {
            Some(existing) => *existing = profile.clone(),
            None => next.profiles.push(profile.clone()),
        }
        self.commit(next)
    }
}

fn load_snapshot(path: &Path) -> HabitStore {
    if !path.exists() {
        info!(
            "event=store_open module=local_store status=ok state=empty path={}",
            path.display()
        );
        return HabitStore::default();
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                "event=store_open module=local_store status=error fallback=empty path={} error={err}",
                path.display()
            );
            return HabitStore::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(store) => {
            info!(
                "event=store_open module=local_store status=ok state=loaded path={}",
                path.display()
            );
            store
        }
        Err(err) => {
            warn!(
                "event=store_open module=local_store status=error fallback=empty path={} error={err}",
                path.display()
            );
            HabitStore::default()
        }
    }
}
