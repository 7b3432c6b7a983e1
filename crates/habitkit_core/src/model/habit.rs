//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record plus its create/patch request
//!   models.
//! - Provide the due-on-date check used to filter the main list view.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `repeat_days` holds weekday indices in `0..=6` (0=Sunday).
//! - `completions` holds each calendar date at most once.
//! - `order` is a display position; repositories keep the values of one
//!   user's habits as a dense `0..N-1` sequence after every mutation.

use crate::dates::day_of_week;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a habit.
pub type HabitId = Uuid;

/// Stable identifier for a habit owner.
pub type UserId = Uuid;

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid reminder time regex"));

/// Validation failures surfaced before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    /// Display name is empty after trimming.
    EmptyName,
    /// A repeat-day index is outside `0..=6`.
    InvalidRepeatDay(u8),
    /// Reminder is enabled but no time-of-day is set.
    MissingReminderTime,
    /// Reminder time is not a `HH:MM` wall-clock value.
    InvalidReminderTime(String),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name cannot be empty"),
            Self::InvalidRepeatDay(day) => {
                write!(f, "repeat day {day} is outside the 0..=6 weekday range")
            }
            Self::MissingReminderTime => {
                write!(f, "reminder is enabled but no reminder time is set")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "reminder time `{value}` is not a HH:MM value")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical record for one tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Stable id assigned at creation.
    pub id: HabitId,
    /// Owning user; enforced at the repository layer.
    pub user_id: UserId,
    /// Non-empty display name.
    pub name: String,
    /// Presentation icon key; unknown keys fall back via the palette.
    pub icon: String,
    /// Presentation color key; unknown keys fall back via the palette.
    pub color_id: String,
    /// Whether a daily reminder is active.
    pub reminder_enabled: bool,
    /// Wall-clock `HH:MM` reminder time; no timezone.
    pub reminder_time: Option<String>,
    /// Weekday indices (0=Sunday..6=Saturday) the habit is due on.
    /// An empty set means the habit is never due.
    pub repeat_days: BTreeSet<u8>,
    /// Calendar days the habit was marked done.
    pub completions: BTreeSet<NaiveDate>,
    /// Immutable creation instant; denominator for the completion rate.
    pub created_at: DateTime<Utc>,
    /// Display position among the owner's habits.
    pub order: u32,
}

/// Attributes supplied when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    pub icon: String,
    pub color_id: String,
    pub reminder_enabled: bool,
    pub reminder_time: Option<String>,
    pub repeat_days: BTreeSet<u8>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color_id: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
    pub repeat_days: Option<BTreeSet<u8>>,
}

impl Habit {
    /// Creates a habit with a generated stable id and empty history.
    ///
    /// # Invariants
    /// - `completions` starts empty.
    /// - `created_at` is captured once and never mutated afterwards.
    pub fn new(user_id: UserId, draft: HabitDraft, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: draft.name,
            icon: draft.icon,
            color_id: draft.color_id,
            reminder_enabled: draft.reminder_enabled,
            reminder_time: draft.reminder_time,
            repeat_days: draft.repeat_days,
            completions: BTreeSet::new(),
            // Millisecond precision: the relational backend stores epoch
            // milliseconds, so anything finer would not round-trip.
            created_at: Utc::now().trunc_subsecs(3),
            order,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        if let Some(&day) = self.repeat_days.iter().find(|&&day| day > 6) {
            return Err(HabitValidationError::InvalidRepeatDay(day));
        }
        if let Some(time) = self.reminder_time.as_deref() {
            if !REMINDER_TIME_RE.is_match(time) {
                return Err(HabitValidationError::InvalidReminderTime(time.to_string()));
            }
        } else if self.reminder_enabled {
            return Err(HabitValidationError::MissingReminderTime);
        }
        Ok(())
    }

    /// Returns whether the habit is scheduled for the given calendar date.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.repeat_days.contains(&day_of_week(date))
    }

    /// Returns whether a completion is recorded for the given date.
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.contains(&date)
    }

    /// Applies a partial update in place; untouched fields keep their
    /// current values. Callers re-validate the merged record.
    pub fn apply_patch(&mut self, patch: HabitPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color_id) = patch.color_id {
            self.color_id = color_id;
        }
        if let Some(reminder_enabled) = patch.reminder_enabled {
            self.reminder_enabled = reminder_enabled;
        }
        if let Some(reminder_time) = patch.reminder_time {
            self.reminder_time = Some(reminder_time);
        }
        if let Some(repeat_days) = patch.repeat_days {
            self.repeat_days = repeat_days;
        }
    }
}
