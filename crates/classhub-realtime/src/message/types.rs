//! Client and server event definitions.
//!
//! Both directions are JSON text frames tagged by `type`.

use serde::{Deserialize, Serialize};

use classhub_core::types::{ClassId, ConversationId, MediaId, MessageId, RoomId};
use classhub_entity::live_room::LiveStatus;
use classhub_entity::pin::Pin;
use classhub_entity::read_marker::ReadMarker;
use classhub_service::conversation::{ConversationJoined, MessageEdit, MessageView, ReactionDelta};
use classhub_service::live::RoomJoin;

use super::error::ErrorCode;

/// Events sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinConversation {
        class_id: ClassId,
    },
    LeaveConversation {
        conversation_id: ConversationId,
    },
    LoadMessages {
        conversation_id: ConversationId,
        #[serde(default)]
        before: Option<MessageId>,
    },
    SendMessage {
        conversation_id: ConversationId,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        reply_to: Option<MessageId>,
        #[serde(default)]
        media_ids: Vec<MediaId>,
    },
    EditMessage {
        message_id: MessageId,
        content: String,
    },
    DeleteMessage {
        message_id: MessageId,
    },
    ReactMessage {
        message_id: MessageId,
        emoji: String,
    },
    RemoveReaction {
        message_id: MessageId,
        emoji: String,
    },
    MarkRead {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    PinMessage {
        message_id: MessageId,
    },
    UnpinMessage {
        message_id: MessageId,
    },
    ListPins {
        conversation_id: ConversationId,
    },
    LoadReadMarkers {
        conversation_id: ConversationId,
    },
    RemoveAttachment {
        message_id: MessageId,
        media_id: MediaId,
    },
    CreateOrJoinRoom {
        class_id: ClassId,
        room_name: String,
    },
    JoinRoom {
        room_id: RoomId,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    PingRoom {
        room_id: RoomId,
    },
    GetClassLiveStatus {
        class_id: ClassId,
    },
    /// Reply to a server `ping`.
    Pong {
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

impl ClientEvent {
    /// Wire name of the event, echoed in error replies.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinConversation { .. } => "join_conversation",
            Self::LeaveConversation { .. } => "leave_conversation",
            Self::LoadMessages { .. } => "load_messages",
            Self::SendMessage { .. } => "send_message",
            Self::EditMessage { .. } => "edit_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::ReactMessage { .. } => "react_message",
            Self::RemoveReaction { .. } => "remove_reaction",
            Self::MarkRead { .. } => "mark_read",
            Self::PinMessage { .. } => "pin_message",
            Self::UnpinMessage { .. } => "unpin_message",
            Self::ListPins { .. } => "list_pins",
            Self::LoadReadMarkers { .. } => "load_read_markers",
            Self::RemoveAttachment { .. } => "remove_attachment",
            Self::CreateOrJoinRoom { .. } => "create_or_join_room",
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::PingRoom { .. } => "ping_room",
            Self::GetClassLiveStatus { .. } => "get_class_live_status",
            Self::Pong { .. } => "pong",
        }
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ConversationJoined(ConversationJoined),
    ConversationLeft {
        conversation_id: ConversationId,
    },
    MessagesLoaded {
        conversation_id: ConversationId,
        messages: Vec<MessageView>,
        has_more: bool,
    },
    NewMessage {
        message: MessageView,
    },
    MessageEdited(MessageEdit),
    MessageDeleted {
        message: MessageView,
    },
    MessageUpdated {
        message: MessageView,
    },
    ReactionAdded(ReactionDelta),
    ReactionRemoved(ReactionDelta),
    MessageRead(ReadMarker),
    MessagePinned(Pin),
    MessageUnpinned {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    Pins {
        conversation_id: ConversationId,
        pins: Vec<Pin>,
    },
    ReadMarkers {
        conversation_id: ConversationId,
        markers: Vec<ReadMarker>,
    },
    RoomJoined(RoomJoin),
    RoomLeft {
        room_id: RoomId,
    },
    LiveStatus {
        class_id: ClassId,
        #[serde(flatten)]
        status: LiveStatus,
    },
    /// Server keepalive; the client answers with `pong`.
    Ping {
        timestamp: i64,
    },
    Error {
        code: ErrorCode,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request: Option<String>,
    },
}
