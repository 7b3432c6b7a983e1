//! User profile read/write model.
//!
//! Identity resolution itself (login, sessions) lives outside the core;
//! this record only carries the display attributes a resolved user owns.

use crate::model::habit::UserId;
use serde::{Deserialize, Serialize};

/// Display attributes for one habit owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable owner id shared with every habit the user owns.
    pub user_id: UserId,
    pub name: String,
    pub age: u32,
    pub email: String,
}
