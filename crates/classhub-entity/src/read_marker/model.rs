//! Read marker entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The last message a user has seen in a conversation. One row per
/// (conversation, user), overwritten on every read event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReadMarker {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub message_id: MessageId,
    pub read_at: DateTime<Utc>,
}
