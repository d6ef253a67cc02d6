//! Conversation entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{ClassId, ConversationId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The group chat bound one-to-one to a class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Owning class (unique).
    pub class_id: ClassId,
    /// Current members: the class's teachers and enrolled students as of
    /// the last roster sync.
    pub member_ids: Vec<UserId>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// When the member set was last replaced.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Check whether a user belongs to this conversation.
    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.member_ids.contains(user_id)
    }
}
