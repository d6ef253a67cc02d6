//! Store traits consumed by the service layer.
//!
//! Every mutation that two connections could race on is a single atomic
//! operation at this boundary (upsert, conditional update, conditional
//! insert). Callers never read-modify-write through these traits.

pub mod memory;
pub mod postgres;

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

/// Result of removing an attachment link.
#[derive(Debug, Clone, Default)]
pub struct UnlinkOutcome {
    /// Whether a link was removed.
    pub removed: bool,
    /// The media row deleted because no link referenced it anymore. The
    /// caller owns deleting the stored object.
    pub orphaned: Option<MediaObject>,
}

/// Durable conversation entities.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug + 'static {
    // -- Directory ------------------------------------------------------

    /// Batch lookup of user profiles. Unknown ids are skipped.
    async fn find_users(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>>;

    /// Insert or replace a user profile.
    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<()>;

    // -- Conversations --------------------------------------------------

    /// Find a conversation by id.
    async fn find_conversation(&self, id: ConversationId) -> AppResult<Option<Conversation>>;

    /// Find the conversation of a class.
    async fn find_conversation_by_class(
        &self,
        class_id: ClassId,
    ) -> AppResult<Option<Conversation>>;

    /// Replace the member set of a class's conversation with the roster's
    /// teachers and students, creating the conversation if absent.
    async fn sync_members(&self, roster: &ClassRoster) -> AppResult<Conversation>;

    // -- Messages -------------------------------------------------------

    /// Insert a message with a fresh time-ordered id.
    async fn create_message(&self, data: &NewMessage) -> AppResult<Message>;

    /// Find a message by id.
    async fn find_message(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Batch lookup of messages by id.
    async fn find_messages(&self, ids: &[MessageId]) -> AppResult<Vec<Message>>;

    /// Up to `limit` messages of a conversation strictly older than
    /// `before`, newest first.
    async fn list_messages_before(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
        limit: usize,
    ) -> AppResult<Vec<Message>>;

    /// Replace the content of a live message owned by `sender_id` and stamp
    /// `edited_at`. Returns `None` when nothing matched (missing, deleted,
    /// or owned by someone else).
    async fn update_message_content(
        &self,
        id: MessageId,
        sender_id: UserId,
        content: &str,
    ) -> AppResult<Option<Message>>;

    /// Soft-delete a live message owned by `sender_id`. Returns `None` when
    /// nothing matched.
    async fn soft_delete_message(
        &self,
        id: MessageId,
        sender_id: UserId,
    ) -> AppResult<Option<Message>>;

    /// Overwrite the stored kind of a live message.
    async fn set_message_kind(&self, id: MessageId, kind: MessageKind) -> AppResult<()>;

    // -- Media ----------------------------------------------------------

    /// Record an uploaded media object.
    async fn register_media(&self, media: &MediaObject) -> AppResult<MediaObject>;

    /// Batch lookup of media objects.
    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaObject>>;

    /// Link media objects to a message in the given order.
    async fn link_attachments(
        &self,
        message_id: MessageId,
        media_ids: &[MediaId],
    ) -> AppResult<Vec<AttachmentLink>>;

    /// All links for the given messages, ordered by message then position.
    async fn list_attachments(&self, message_ids: &[MessageId]) -> AppResult<Vec<AttachmentLink>>;

    /// Remove one link from a live message owned by `sender_id`; deletes
    /// the media row if no other link remains. Nothing is removed for any
    /// other caller.
    async fn unlink_attachment(
        &self,
        message_id: MessageId,
        sender_id: UserId,
        media_id: MediaId,
    ) -> AppResult<UnlinkOutcome>;

    // -- Reactions ------------------------------------------------------

    /// Add a reaction. Returns `false` if the tuple already existed.
    async fn add_reaction(&self, message_id: MessageId, user_id: UserId, emoji: &str)
    -> AppResult<bool>;

    /// Remove a reaction. Returns `false` if the tuple did not exist.
    async fn remove_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool>;

    /// All reactions on the given messages in reaction order.
    async fn list_reactions(&self, message_ids: &[MessageId]) -> AppResult<Vec<Reaction>>;

    // -- Read markers ---------------------------------------------------

    /// Create or overwrite a user's read marker.
    async fn upsert_read_marker(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        message_id: MessageId,
    ) -> AppResult<ReadMarker>;

    /// All read markers of a conversation.
    async fn list_read_markers(&self, conversation_id: ConversationId)
    -> AppResult<Vec<ReadMarker>>;

    // -- Pins -----------------------------------------------------------

    /// Pin a message. Pinning twice keeps the first pin and returns it.
    async fn pin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        pinned_by: UserId,
    ) -> AppResult<Pin>;

    /// Unpin a message. Returns `false` if it was not pinned.
    async fn unpin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> AppResult<bool>;

    /// Pins of a conversation, oldest first.
    async fn list_pins(&self, conversation_id: ConversationId) -> AppResult<Vec<Pin>>;

    // -- Health ---------------------------------------------------------

    /// Check connectivity to the backing store.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Durable live room rows.
#[async_trait]
pub trait LiveRoomStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an open room with the creator as sole participant, unless the
    /// class already has an open room. Returns `None` on that conflict.
    async fn insert_open_room(
        &self,
        class_id: ClassId,
        name: &str,
        created_by: UserId,
    ) -> AppResult<Option<LiveRoom>>;

    /// The open room of a class, if any.
    async fn find_open_room(&self, class_id: ClassId) -> AppResult<Option<LiveRoom>>;

    /// Find a room by id regardless of status.
    async fn find_room(&self, id: RoomId) -> AppResult<Option<LiveRoom>>;

    /// Add a participant to an open room; a no-op if already present.
    /// Returns `None` if the room is missing or closed.
    async fn add_participant(&self, id: RoomId, user_id: UserId) -> AppResult<Option<LiveRoom>>;

    /// Remove a participant from an open room, closing it when the set
    /// becomes empty. Returns `None` if the room is missing or closed.
    async fn remove_participant(
        &self,
        id: RoomId,
        user_id: UserId,
    ) -> AppResult<Option<LiveRoom>>;
}
