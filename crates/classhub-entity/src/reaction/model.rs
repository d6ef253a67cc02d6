//! Reaction entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{MessageId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's emoji on one message. Unique per (message, user, emoji).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reaction {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}
