//! Habit use-case service.
//!
//! # Responsibility
//! - Provide the single entry point UI layers consume: listing, due-date
//!   filtering, CRUD, completion toggles, reordering, statistics and the
//!   JSON export dump.
//! - Resolve the session's user identity before any repository call.
//!
//! # Invariants
//! - Every operation requires a resolved user; unresolved sessions get
//!   `ServiceError::AuthRequired` before any storage access.
//! - Validation and not-found conditions are lifted out of backend errors
//!   so callers can surface them as inline messages.
//! - The service never bypasses repository validation/persistence
//!   contracts.

use crate::dates::local_today;
use crate::model::habit::{Habit, HabitDraft, HabitId, HabitPatch, HabitValidationError, UserId};
use crate::model::profile::UserProfile;
use crate::repo::habit_repo::{HabitRepository, RepoError};
use crate::stats::{habit_stats, HabitStats};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resolved identity for one UI session, passed explicitly to every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// `None` until authentication has resolved a user.
    pub user_id: Option<UserId>,
}

impl SessionContext {
    /// Context for a resolved user.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Context with no resolved user; every service call will fail with
    /// `AuthRequired`.
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn require_user(&self) -> Result<UserId, ServiceError> {
        self.user_id.ok_or(ServiceError::AuthRequired)
    }
}

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Call was made with no resolved user.
    AuthRequired,
    /// Input failed record validation; safe to show inline.
    Validation(HabitValidationError),
    /// Target habit does not exist for the session's user.
    NotFound(HabitId),
    /// Export document could not be serialized.
    Export(serde_json::Error),
    /// Storage/backend failure, opaque cause.
    Backend(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "no user is signed in"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Backend(other),
        }
    }
}

/// Read-only dump of one user's full collection.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub profile: Option<UserProfile>,
    pub habits: Vec<Habit>,
}

/// Habit service facade over repository implementations.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the session user's habits ordered by display position.
    pub fn list_habits(&self, ctx: &SessionContext) -> Result<Vec<Habit>, ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.list(user_id)?)
    }

    /// Lists only the habits scheduled for the given calendar date.
    pub fn habits_due_on(
        &self,
        ctx: &SessionContext,
        date: NaiveDate,
    ) -> Result<Vec<Habit>, ServiceError> {
        let mut habits = self.list_habits(ctx)?;
        habits.retain(|habit| habit.is_due_on(date));
        Ok(habits)
    }

    /// Creates a habit at the end of the display order.
    pub fn create_habit(
        &mut self,
        ctx: &SessionContext,
        draft: HabitDraft,
    ) -> Result<Habit, ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.create(user_id, draft)?)
    }

    /// Merges the provided fields into an existing habit.
    pub fn update_habit(
        &mut self,
        ctx: &SessionContext,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<Habit, ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.update(user_id, id, patch)?)
    }

    /// Deletes a habit and its completion history. Unknown ids succeed.
    pub fn delete_habit(&mut self, ctx: &SessionContext, id: HabitId) -> Result<(), ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.delete(user_id, id)?)
    }

    /// Toggles a completion for the given date, defaulting to the local
    /// today. Calling twice with the same date restores the original set.
    pub fn toggle_completion(
        &mut self,
        ctx: &SessionContext,
        id: HabitId,
        date: Option<NaiveDate>,
    ) -> Result<Habit, ServiceError> {
        let user_id = ctx.require_user()?;
        let date = date.unwrap_or_else(local_today);
        Ok(self.repo.toggle_completion(user_id, id, date)?)
    }

    /// Moves one habit in the display ordering; the result is the full
    /// renumbered list.
    pub fn reorder_habits(
        &mut self,
        ctx: &SessionContext,
        from_index: usize,
        to_index: usize,
    ) -> Result<Vec<Habit>, ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.reorder(user_id, from_index, to_index)?)
    }

    /// Derived statistics for one habit against an explicit reference
    /// date/instant.
    pub fn habit_stats_on(
        &self,
        ctx: &SessionContext,
        id: HabitId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<HabitStats, ServiceError> {
        let user_id = ctx.require_user()?;
        let habit = self
            .repo
            .get(user_id, id)?
            .ok_or(ServiceError::NotFound(id))?;
        Ok(habit_stats(&habit.completions, habit.created_at, today, now))
    }

    /// Derived statistics for one habit as of the current local day.
    pub fn habit_stats(
        &self,
        ctx: &SessionContext,
        id: HabitId,
    ) -> Result<HabitStats, ServiceError> {
        self.habit_stats_on(ctx, id, local_today(), Utc::now())
    }

    /// Loads the session user's display profile.
    pub fn load_profile(&self, ctx: &SessionContext) -> Result<Option<UserProfile>, ServiceError> {
        let user_id = ctx.require_user()?;
        Ok(self.repo.load_profile(user_id)?)
    }

    /// Creates or replaces the session user's display profile.
    ///
    /// The owner id always comes from the session context, so a profile
    /// can never be written for a different user.
    pub fn save_profile(
        &mut self,
        ctx: &SessionContext,
        name: impl Into<String>,
        age: u32,
        email: impl Into<String>,
    ) -> Result<UserProfile, ServiceError> {
        let user_id = ctx.require_user()?;
        let profile = UserProfile {
            user_id,
            name: name.into(),
            age,
            email: email.into(),
        };
        self.repo.save_profile(&profile)?;
        Ok(profile)
    }

    /// Serializes the user's full collection (profile, habits, resolved
    /// completions) as one pretty-printed JSON document.
    pub fn export_json(&self, ctx: &SessionContext) -> Result<String, ServiceError> {
        let user_id = ctx.require_user()?;
        let document = ExportDocument {
            profile: self.repo.load_profile(user_id)?,
            habits: self.repo.list(user_id)?,
        };
        serde_json::to_string_pretty(&document).map_err(ServiceError::Export)
    }
}
