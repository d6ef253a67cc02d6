//! Live room entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{ClassId, RoomId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::RoomStatus;

/// A class's live video session. At most one room per class is open.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LiveRoom {
    /// Unique room identifier, also the video provider's room name.
    pub id: RoomId,
    /// Owning class.
    pub class_id: ClassId,
    /// Human-readable title given by the creator.
    pub name: String,
    /// Open or closed.
    pub status: RoomStatus,
    /// User who created the room.
    pub created_by: UserId,
    /// Users currently in the room.
    pub participant_ids: Vec<UserId>,
    /// When the room was opened.
    pub started_at: DateTime<Utc>,
    /// When the last participant left.
    pub ended_at: Option<DateTime<Utc>>,
}

impl LiveRoom {
    /// Whether the room is open.
    pub fn is_open(&self) -> bool {
        self.status == RoomStatus::Open
    }

    /// Whether a user is in the room.
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participant_ids.contains(user_id)
    }
}

/// Answer to "is this class live right now".
///
/// `is_live` and `teacher_online` are independent facts: a room can be open
/// while its teacher's presence signal has lapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_online: Option<bool>,
}

impl LiveStatus {
    /// No open room.
    pub fn offline() -> Self {
        Self {
            is_live: false,
            room_id: None,
            teacher_online: None,
        }
    }
}
