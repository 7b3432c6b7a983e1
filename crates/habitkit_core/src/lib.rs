//! Core domain logic for habitkit.
//! This crate is the single source of truth for habit business invariants.

pub mod dates;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::habit::{
    Habit, HabitDraft, HabitId, HabitPatch, HabitValidationError, UserId,
};
pub use model::palette::{
    color_by_id, icon_by_key, HabitColor, HabitIcon, HABIT_COLORS, HABIT_ICONS,
};
pub use model::profile::UserProfile;
pub use repo::habit_repo::{HabitRepository, RepoError, RepoResult, SqliteHabitRepository};
pub use repo::local_store::{LocalStoreHabitRepository, StoreError};
pub use service::habit_service::{
    ExportDocument, HabitService, ServiceError, SessionContext,
};
pub use stats::{best_streak, completion_rate, current_streak, HabitStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
