//! Message-to-media link.

use chrono::{DateTime, Utc};
use classhub_core::types::{MediaId, MessageId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Links a message to a media object. A media object is deleted once the
/// last link that references it is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AttachmentLink {
    pub message_id: MessageId,
    pub media_id: MediaId,
    /// Position among the message's attachments.
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
