//! Client-facing shapes produced by the conversation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classhub_core::types::{ClassId, ConversationId, MediaId, MessageId, UserId};
use classhub_entity::message::MessageKind;
use classhub_entity::reaction::ReactionSummary;
use classhub_entity::user::UserRole;

/// A user as shown in rosters and message headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub display_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// An attachment with a signed read URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentView {
    pub media_id: MediaId,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
}

/// Preview of the message being replied to.
///
/// A deleted target is rendered as `{id, deleted: true}` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPreview {
    pub id: MessageId,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ReplyPreview {
    /// Preview of a deleted (or vanished) target.
    pub fn deleted(id: MessageId) -> Self {
        Self {
            id,
            deleted: true,
            sender_id: None,
            sender_name: None,
            kind: None,
            content: None,
        }
    }
}

/// A fully resolved message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: UserView,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyPreview>,
    pub attachments: Vec<AttachmentView>,
    pub reactions: Vec<ReactionSummary>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Result of joining a class conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationJoined {
    pub conversation_id: ConversationId,
    pub class_id: ClassId,
    pub members: Vec<UserView>,
}

/// The minimal delta broadcast after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEdit {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub content: String,
    pub edited_at: DateTime<Utc>,
}

/// A reaction change, broadcast raw for clients to re-aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionDelta {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
}
