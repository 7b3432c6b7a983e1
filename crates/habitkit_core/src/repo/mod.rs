//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage-agnostic habit data-access contract.
//! - Isolate SQLite and local-snapshot details from service orchestration.
//!
//! # Invariants
//! - Both backends expose identical observable behavior: return values,
//!   error conditions and resulting `order` values never depend on the
//!   chosen store.
//! - Repository writes enforce `Habit::validate()` before persistence.

pub mod habit_repo;
pub mod local_store;
