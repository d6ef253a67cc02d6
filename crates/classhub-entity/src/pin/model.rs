//! Pin entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A pinned message. Absence of a row means the message is not pinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Pin {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub pinned_by: UserId,
    pub pinned_at: DateTime<Utc>,
}
