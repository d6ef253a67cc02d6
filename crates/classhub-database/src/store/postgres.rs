//! PostgreSQL-backed store composed from the per-entity repositories.

use async_trait::async_trait;

use classhub_core::result::AppResult;
use classhub_core::types::{ClassId, ConversationId, MediaId, MessageId, RoomId, UserId};
use classhub_entity::class::ClassRoster;
use classhub_entity::conversation::Conversation;
use classhub_entity::live_room::LiveRoom;
use classhub_entity::media::{AttachmentLink, MediaObject};
use classhub_entity::message::{Message, MessageKind, NewMessage};
use classhub_entity::pin::Pin;
use classhub_entity::reaction::Reaction;
use classhub_entity::read_marker::ReadMarker;
use classhub_entity::user::UserProfile;

use super::{ChatStore, LiveRoomStore, UnlinkOutcome};
use crate::connection::DatabasePool;
use crate::repositories::{
    ConversationRepository, LiveRoomRepository, MediaRepository, MessageRepository,
    PinRepository, ReactionRepository, ReadMarkerRepository, UserRepository,
};

/// Store implementation over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabasePool,
    users: UserRepository,
    conversations: ConversationRepository,
    messages: MessageRepository,
    media: MediaRepository,
    reactions: ReactionRepository,
    read_markers: ReadMarkerRepository,
    pins: PinRepository,
    live_rooms: LiveRoomRepository,
}

impl PgStore {
    /// Build every repository over one pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            media: MediaRepository::new(pool.clone()),
            reactions: ReactionRepository::new(pool.clone()),
            read_markers: ReadMarkerRepository::new(pool.clone()),
            pins: PinRepository::new(pool.clone()),
            live_rooms: LiveRoomRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn find_users(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        self.users.find_by_ids(ids).await
    }

    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<()> {
        self.users.upsert(profile).await
    }

    async fn find_conversation(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        self.conversations.find_by_id(id).await
    }

    async fn find_conversation_by_class(
        &self,
        class_id: ClassId,
    ) -> AppResult<Option<Conversation>> {
        self.conversations.find_by_class(class_id).await
    }

    async fn sync_members(&self, roster: &ClassRoster) -> AppResult<Conversation> {
        self.conversations
            .replace_members(roster.class_id, &roster.member_ids())
            .await
    }

    async fn create_message(&self, data: &NewMessage) -> AppResult<Message> {
        self.messages.create(data).await
    }

    async fn find_message(&self, id: MessageId) -> AppResult<Option<Message>> {
        self.messages.find_by_id(id).await
    }

    async fn find_messages(&self, ids: &[MessageId]) -> AppResult<Vec<Message>> {
        self.messages.find_by_ids(ids).await
    }

    async fn list_messages_before(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        self.messages
            .list_before(conversation_id, before, limit)
            .await
    }

    async fn update_message_content(
        &self,
        id: MessageId,
        sender_id: UserId,
        content: &str,
    ) -> AppResult<Option<Message>> {
        self.messages.update_content(id, sender_id, content).await
    }

    async fn soft_delete_message(
        &self,
        id: MessageId,
        sender_id: UserId,
    ) -> AppResult<Option<Message>> {
        self.messages.soft_delete(id, sender_id).await
    }

    async fn set_message_kind(&self, id: MessageId, kind: MessageKind) -> AppResult<()> {
        self.messages.set_kind(id, kind).await
    }

    async fn register_media(&self, media: &MediaObject) -> AppResult<MediaObject> {
        self.media.create(media).await
    }

    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaObject>> {
        self.media.find_by_ids(ids).await
    }

    async fn link_attachments(
        &self,
        message_id: MessageId,
        media_ids: &[MediaId],
    ) -> AppResult<Vec<AttachmentLink>> {
        self.media.link(message_id, media_ids).await
    }

    async fn list_attachments(&self, message_ids: &[MessageId]) -> AppResult<Vec<AttachmentLink>> {
        self.media.list_for_messages(message_ids).await
    }

    async fn unlink_attachment(
        &self,
        message_id: MessageId,
        sender_id: UserId,
        media_id: MediaId,
    ) -> AppResult<UnlinkOutcome> {
        self.media.unlink(message_id, sender_id, media_id).await
    }

    async fn add_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        self.reactions.add(message_id, user_id, emoji).await
    }

    async fn remove_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        self.reactions.remove(message_id, user_id, emoji).await
    }

    async fn list_reactions(&self, message_ids: &[MessageId]) -> AppResult<Vec<Reaction>> {
        self.reactions.list_for_messages(message_ids).await
    }

    async fn upsert_read_marker(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        message_id: MessageId,
    ) -> AppResult<ReadMarker> {
        self.read_markers
            .upsert(conversation_id, user_id, message_id)
            .await
    }

    async fn list_read_markers(
        &self,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<ReadMarker>> {
        self.read_markers
            .list_for_conversation(conversation_id)
            .await
    }

    async fn pin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        pinned_by: UserId,
    ) -> AppResult<Pin> {
        self.pins.pin(conversation_id, message_id, pinned_by).await
    }

    async fn unpin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> AppResult<bool> {
        self.pins.unpin(conversation_id, message_id).await
    }

    async fn list_pins(&self, conversation_id: ConversationId) -> AppResult<Vec<Pin>> {
        self.pins.list_for_conversation(conversation_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}

#[async_trait]
impl LiveRoomStore for PgStore {
    async fn insert_open_room(
        &self,
        class_id: ClassId,
        name: &str,
        created_by: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        self.live_rooms
            .insert_open(class_id, name, created_by)
            .await
    }

    async fn find_open_room(&self, class_id: ClassId) -> AppResult<Option<LiveRoom>> {
        self.live_rooms.find_open_by_class(class_id).await
    }

    async fn find_room(&self, id: RoomId) -> AppResult<Option<LiveRoom>> {
        self.live_rooms.find_by_id(id).await
    }

    async fn add_participant(&self, id: RoomId, user_id: UserId) -> AppResult<Option<LiveRoom>> {
        self.live_rooms.add_participant(id, user_id).await
    }

    async fn remove_participant(
        &self,
        id: RoomId,
        user_id: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        self.live_rooms.remove_participant(id, user_id).await
    }
}
