//! In-process store for development and tests.
//!
//! All state sits behind one `RwLock`, so each trait call is atomic with
//! respect to every other call, matching the single-statement guarantees of
//! the PostgreSQL store. Message order is insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::types::{ClassId, ConversationId, MediaId, MessageId, RoomId, UserId};
use classhub_entity::class::ClassRoster;
use classhub_entity::conversation::Conversation;
use classhub_entity::live_room::{LiveRoom, RoomStatus};
use classhub_entity::media::{AttachmentLink, MediaObject};
use classhub_entity::message::{Message, MessageKind, MessageState, NewMessage};
use classhub_entity::pin::Pin;
use classhub_entity::reaction::Reaction;
use classhub_entity::read_marker::ReadMarker;
use classhub_entity::user::UserProfile;

use super::{ChatStore, LiveRoomStore, UnlinkOutcome};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserProfile>,
    conversations: HashMap<ConversationId, Conversation>,
    class_index: HashMap<ClassId, ConversationId>,
    messages: Vec<Message>,
    message_index: HashMap<MessageId, usize>,
    media: HashMap<MediaId, MediaObject>,
    attachments: Vec<AttachmentLink>,
    reactions: Vec<Reaction>,
    read_markers: HashMap<(ConversationId, UserId), ReadMarker>,
    pins: Vec<Pin>,
    rooms: HashMap<RoomId, LiveRoom>,
}

impl State {
    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let idx = *self.message_index.get(&id)?;
        self.messages.get_mut(idx)
    }
}

/// Store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn find_users(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.users.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn find_conversation(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self.state.read().await.conversations.get(&id).cloned())
    }

    async fn find_conversation_by_class(
        &self,
        class_id: ClassId,
    ) -> AppResult<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state
            .class_index
            .get(&class_id)
            .and_then(|id| state.conversations.get(id))
            .cloned())
    }

    async fn sync_members(&self, roster: &ClassRoster) -> AppResult<Conversation> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let members = roster.member_ids();

        if let Some(id) = state.class_index.get(&roster.class_id).copied() {
            let conversation = state
                .conversations
                .get_mut(&id)
                .ok_or_else(|| AppError::internal("conversation index out of sync"))?;
            conversation.member_ids = members;
            conversation.updated_at = now;
            return Ok(conversation.clone());
        }

        let conversation = Conversation {
            id: ConversationId::new(),
            class_id: roster.class_id,
            member_ids: members,
            created_at: now,
            updated_at: now,
        };
        state.class_index.insert(roster.class_id, conversation.id);
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn create_message(&self, data: &NewMessage) -> AppResult<Message> {
        let mut state = self.state.write().await;
        let message = Message {
            id: MessageId::new(),
            conversation_id: data.conversation_id,
            sender_id: data.sender_id,
            sender_role: data.sender_role,
            kind: data.kind,
            state: MessageState::Active {
                content: data.content.clone(),
            },
            reply_to: data.reply_to,
            created_at: Utc::now(),
            edited_at: None,
        };
        let idx = state.messages.len();
        state.message_index.insert(message.id, idx);
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: MessageId) -> AppResult<Option<Message>> {
        let state = self.state.read().await;
        Ok(state
            .message_index
            .get(&id)
            .and_then(|idx| state.messages.get(*idx))
            .cloned())
    }

    async fn find_messages(&self, ids: &[MessageId]) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.message_index.get(id))
            .filter_map(|idx| state.messages.get(*idx))
            .cloned()
            .collect())
    }

    async fn list_messages_before(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        let cursor_idx = before.and_then(|id| state.message_index.get(&id).copied());

        Ok(state
            .messages
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, m)| m.conversation_id == conversation_id)
            .filter(|(idx, m)| match (before, cursor_idx) {
                (None, _) => true,
                (Some(_), Some(cursor)) => *idx < cursor,
                (Some(cursor), None) => m.id < cursor,
            })
            .take(limit)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn update_message_content(
        &self,
        id: MessageId,
        sender_id: UserId,
        content: &str,
    ) -> AppResult<Option<Message>> {
        let mut state = self.state.write().await;
        let Some(message) = state.message_mut(id) else {
            return Ok(None);
        };
        if message.sender_id != sender_id || message.is_deleted() {
            return Ok(None);
        }
        message.state = MessageState::Active {
            content: Some(content.to_string()),
        };
        message.edited_at = Some(Utc::now());
        Ok(Some(message.clone()))
    }

    async fn soft_delete_message(
        &self,
        id: MessageId,
        sender_id: UserId,
    ) -> AppResult<Option<Message>> {
        let mut state = self.state.write().await;
        let Some(message) = state.message_mut(id) else {
            return Ok(None);
        };
        if message.sender_id != sender_id || message.is_deleted() {
            return Ok(None);
        }
        message.state = MessageState::Deleted {
            deleted_at: Utc::now(),
        };
        message.kind = MessageKind::Deleted;
        Ok(Some(message.clone()))
    }

    async fn set_message_kind(&self, id: MessageId, kind: MessageKind) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(message) = state.message_mut(id) {
            if !message.is_deleted() {
                message.kind = kind;
            }
        }
        Ok(())
    }

    async fn register_media(&self, media: &MediaObject) -> AppResult<MediaObject> {
        let mut state = self.state.write().await;
        if state.media.values().any(|m| m.object_key == media.object_key) {
            return Err(AppError::conflict(format!(
                "Media with object key '{}' already exists",
                media.object_key
            )));
        }
        state.media.insert(media.id, media.clone());
        Ok(media.clone())
    }

    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaObject>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.media.get(id).cloned())
            .collect())
    }

    async fn link_attachments(
        &self,
        message_id: MessageId,
        media_ids: &[MediaId],
    ) -> AppResult<Vec<AttachmentLink>> {
        let mut state = self.state.write().await;
        if let Some(missing) = media_ids.iter().find(|id| !state.media.contains_key(id)) {
            return Err(AppError::database(format!(
                "Media {missing} does not exist"
            )));
        }

        let now = Utc::now();
        let links: Vec<AttachmentLink> = media_ids
            .iter()
            .enumerate()
            .map(|(position, media_id)| AttachmentLink {
                message_id,
                media_id: *media_id,
                position: position as i32,
                created_at: now,
            })
            .collect();
        state.attachments.extend(links.iter().cloned());
        Ok(links)
    }

    async fn list_attachments(&self, message_ids: &[MessageId]) -> AppResult<Vec<AttachmentLink>> {
        let state = self.state.read().await;
        let mut links: Vec<AttachmentLink> = state
            .attachments
            .iter()
            .filter(|l| message_ids.contains(&l.message_id))
            .cloned()
            .collect();
        links.sort_by_key(|l| (l.message_id, l.position));
        Ok(links)
    }

    async fn unlink_attachment(
        &self,
        message_id: MessageId,
        sender_id: UserId,
        media_id: MediaId,
    ) -> AppResult<UnlinkOutcome> {
        let mut state = self.state.write().await;
        let owned = state
            .messages
            .iter()
            .any(|m| m.id == message_id && m.sender_id == sender_id && !m.is_deleted());
        if !owned {
            return Ok(UnlinkOutcome {
                removed: false,
                orphaned: None,
            });
        }

        let before = state.attachments.len();
        state
            .attachments
            .retain(|l| !(l.message_id == message_id && l.media_id == media_id));
        let removed = state.attachments.len() < before;

        let still_referenced = state.attachments.iter().any(|l| l.media_id == media_id);
        let orphaned = if removed && !still_referenced {
            state.media.remove(&media_id)
        } else {
            None
        };
        Ok(UnlinkOutcome { removed, orphaned })
    }

    async fn add_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let exists = state
            .reactions
            .iter()
            .any(|r| r.message_id == message_id && r.user_id == user_id && r.emoji == emoji);
        if exists {
            return Ok(false);
        }
        state.reactions.push(Reaction {
            message_id,
            user_id,
            emoji: emoji.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.reactions.len();
        state
            .reactions
            .retain(|r| !(r.message_id == message_id && r.user_id == user_id && r.emoji == emoji));
        Ok(state.reactions.len() < before)
    }

    async fn list_reactions(&self, message_ids: &[MessageId]) -> AppResult<Vec<Reaction>> {
        let state = self.state.read().await;
        Ok(state
            .reactions
            .iter()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect())
    }

    async fn upsert_read_marker(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        message_id: MessageId,
    ) -> AppResult<ReadMarker> {
        let mut state = self.state.write().await;
        let marker = ReadMarker {
            conversation_id,
            user_id,
            message_id,
            read_at: Utc::now(),
        };
        state
            .read_markers
            .insert((conversation_id, user_id), marker.clone());
        Ok(marker)
    }

    async fn list_read_markers(
        &self,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<ReadMarker>> {
        let state = self.state.read().await;
        let mut markers: Vec<ReadMarker> = state
            .read_markers
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        markers.sort_by_key(|m| m.read_at);
        Ok(markers)
    }

    async fn pin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        pinned_by: UserId,
    ) -> AppResult<Pin> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .pins
            .iter()
            .find(|p| p.conversation_id == conversation_id && p.message_id == message_id)
        {
            return Ok(existing.clone());
        }
        let pin = Pin {
            conversation_id,
            message_id,
            pinned_by,
            pinned_at: Utc::now(),
        };
        state.pins.push(pin.clone());
        Ok(pin)
    }

    async fn unpin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.pins.len();
        state
            .pins
            .retain(|p| !(p.conversation_id == conversation_id && p.message_id == message_id));
        Ok(state.pins.len() < before)
    }

    async fn list_pins(&self, conversation_id: ConversationId) -> AppResult<Vec<Pin>> {
        let state = self.state.read().await;
        Ok(state
            .pins
            .iter()
            .filter(|p| p.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl LiveRoomStore for MemoryStore {
    async fn insert_open_room(
        &self,
        class_id: ClassId,
        name: &str,
        created_by: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        let mut state = self.state.write().await;
        if state
            .rooms
            .values()
            .any(|r| r.class_id == class_id && r.is_open())
        {
            return Ok(None);
        }
        let room = LiveRoom {
            id: RoomId::new(),
            class_id,
            name: name.to_string(),
            status: RoomStatus::Open,
            created_by,
            participant_ids: vec![created_by],
            started_at: Utc::now(),
            ended_at: None,
        };
        state.rooms.insert(room.id, room.clone());
        Ok(Some(room))
    }

    async fn find_open_room(&self, class_id: ClassId) -> AppResult<Option<LiveRoom>> {
        let state = self.state.read().await;
        Ok(state
            .rooms
            .values()
            .find(|r| r.class_id == class_id && r.is_open())
            .cloned())
    }

    async fn find_room(&self, id: RoomId) -> AppResult<Option<LiveRoom>> {
        Ok(self.state.read().await.rooms.get(&id).cloned())
    }

    async fn add_participant(&self, id: RoomId, user_id: UserId) -> AppResult<Option<LiveRoom>> {
        let mut state = self.state.write().await;
        let Some(room) = state.rooms.get_mut(&id).filter(|r| r.is_open()) else {
            return Ok(None);
        };
        if !room.has_participant(&user_id) {
            room.participant_ids.push(user_id);
        }
        Ok(Some(room.clone()))
    }

    async fn remove_participant(
        &self,
        id: RoomId,
        user_id: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        let mut state = self.state.write().await;
        let Some(room) = state.rooms.get_mut(&id).filter(|r| r.is_open()) else {
            return Ok(None);
        };
        room.participant_ids.retain(|p| *p != user_id);
        if room.participant_ids.is_empty() {
            room.status = RoomStatus::Closed;
            room.ended_at = Some(Utc::now());
        }
        Ok(Some(room.clone()))
    }
}
