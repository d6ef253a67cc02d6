//! Message entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::MessageKind;
use super::state::MessageState;
use crate::user::UserRole;

/// A message row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_role: UserRole,
    pub kind: MessageKind,
    pub content: Option<String>,
    pub reply_to: Option<MessageId>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique, time-ordered message identifier.
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender_id: UserId,
    /// Author's role at send time.
    pub sender_role: UserRole,
    /// Kind recorded at send time (text, image, file).
    pub kind: MessageKind,
    /// Live or soft-deleted.
    pub state: MessageState,
    /// Weak reference to the message being replied to.
    pub reply_to: Option<MessageId>,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
    /// When the content was last edited.
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Kind as served to clients; a deleted message is always `Deleted`.
    pub fn effective_kind(&self) -> MessageKind {
        if self.state.is_deleted() {
            MessageKind::Deleted
        } else {
            self.kind
        }
    }

    /// Whether the message was soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let state = match row.deleted_at {
            Some(deleted_at) => MessageState::Deleted { deleted_at },
            None => MessageState::Active {
                content: row.content,
            },
        };
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            sender_role: row.sender_role,
            kind: row.kind,
            state,
            reply_to: row.reply_to,
            created_at: row.created_at,
            edited_at: row.edited_at,
        }
    }
}

/// Data needed to insert a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_role: UserRole,
    pub kind: MessageKind,
    pub content: Option<String>,
    pub reply_to: Option<MessageId>,
}
