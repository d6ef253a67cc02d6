//! User directory profile.

use classhub_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// The slice of a user record the conversation subsystem reads.
///
/// User accounts are owned by the classroom CRUD application; this is a
/// read-only projection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// User identifier.
    pub id: UserId,
    /// Name shown next to messages and in rosters.
    pub display_name: String,
    /// The user's role.
    pub role: UserRole,
    /// Object storage key of the avatar image, if any.
    pub avatar_key: Option<String>,
}
