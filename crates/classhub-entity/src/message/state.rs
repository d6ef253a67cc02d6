//! Message lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a message still serves its content.
///
/// A deleted message keeps its id and position in history, but its content
/// is gone from the domain model entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MessageState {
    /// The message is live. Content may be absent for attachment-only messages.
    Active {
        /// Text content.
        content: Option<String>,
    },
    /// The message was soft-deleted by its sender.
    Deleted {
        /// When the message was deleted.
        deleted_at: DateTime<Utc>,
    },
}

impl MessageState {
    /// Content if the message is active.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Active { content } => content.as_deref(),
            Self::Deleted { .. } => None,
        }
    }

    /// Whether the message was soft-deleted.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Deletion timestamp, if deleted.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Deleted { deleted_at } => Some(*deleted_at),
            Self::Active { .. } => None,
        }
    }
}
