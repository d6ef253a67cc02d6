//! Conversation service: every chat operation behind the realtime engine.

use std::sync::Arc;

use tracing::{info, warn};

use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::storage::ObjectStorage;
use classhub_core::types::{ClassId, ConversationId, CursorPage, MediaId, MessageId};
use classhub_database::ChatStore;
use classhub_entity::class::ClassRoster;
use classhub_entity::conversation::Conversation;
use classhub_entity::message::{Message, MessageKind, NewMessage};
use classhub_entity::pin::Pin;
use classhub_entity::read_marker::ReadMarker;
use classhub_storage::SignedUrlCache;

use super::assembler::MessageAssembler;
use super::validation::{normalize_content, normalize_emoji, normalize_media_ids, required_content};
use super::view::{ConversationJoined, MessageEdit, MessageView, ReactionDelta};
use crate::context::RequestContext;

/// Input for [`ConversationService::send_message`].
#[derive(Debug, Clone, Default)]
pub struct SendMessage {
    pub conversation_id: ConversationId,
    pub content: Option<String>,
    pub reply_to: Option<MessageId>,
    pub media_ids: Vec<MediaId>,
}

/// Message lifecycle, page assembly, and the small per-conversation
/// records (reactions, read markers, pins).
#[derive(Debug, Clone)]
pub struct ConversationService {
    store: Arc<dyn ChatStore>,
    storage: Arc<dyn ObjectStorage>,
    urls: SignedUrlCache,
    assembler: MessageAssembler,
    page_size: usize,
}

impl ConversationService {
    /// Creates a new conversation service.
    pub fn new(
        store: Arc<dyn ChatStore>,
        storage: Arc<dyn ObjectStorage>,
        urls: SignedUrlCache,
        page_size: usize,
    ) -> Self {
        let assembler = MessageAssembler::new(Arc::clone(&store), urls.clone());
        Self {
            store,
            storage,
            urls,
            assembler,
            page_size: page_size.max(1),
        }
    }

    /// The configured history page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // -- Conversations --------------------------------------------------

    /// Resolve the conversation of a class for the caller and its roster.
    pub async fn join(&self, ctx: &RequestContext, class_id: ClassId) -> AppResult<ConversationJoined> {
        let conversation = self
            .store
            .find_conversation_by_class(class_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;

        ensure_member(ctx, &conversation)?;

        let members = self.assembler.users(&conversation.member_ids).await?;
        Ok(ConversationJoined {
            conversation_id: conversation.id,
            class_id: conversation.class_id,
            members,
        })
    }

    /// Find a conversation the caller belongs to.
    pub async fn member_conversation(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> AppResult<Conversation> {
        let conversation = self
            .store
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;
        ensure_member(ctx, &conversation)?;
        Ok(conversation)
    }

    /// The conversation a message belongs to.
    pub async fn conversation_of(&self, message_id: MessageId) -> AppResult<ConversationId> {
        Ok(self.require_message(message_id).await?.conversation_id)
    }

    /// Replace a class conversation's members with the roster, creating
    /// the conversation on first sync.
    pub async fn sync_roster(&self, roster: &ClassRoster) -> AppResult<Conversation> {
        let conversation = self.store.sync_members(roster).await?;
        info!(
            class_id = %roster.class_id,
            conversation_id = %conversation.id,
            members = conversation.member_ids.len(),
            "Synced conversation members"
        );
        Ok(conversation)
    }

    // -- History --------------------------------------------------------

    /// One page of history older than `before`, oldest first.
    pub async fn load_messages(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
    ) -> AppResult<CursorPage<MessageView>> {
        self.load_messages_with_limit(conversation_id, before, self.page_size)
            .await
    }

    /// Like [`load_messages`](Self::load_messages) with an explicit limit.
    pub async fn load_messages_with_limit(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
        limit: usize,
    ) -> AppResult<CursorPage<MessageView>> {
        let limit = limit.max(1);
        let rows = self
            .store
            .list_messages_before(conversation_id, before, limit + 1)
            .await?;
        let page = CursorPage::from_newest_first(rows, limit);
        let items = self.assembler.many(page.items).await?;
        Ok(CursorPage {
            items,
            has_more: page.has_more,
        })
    }

    // -- Message lifecycle ----------------------------------------------

    /// Create a message with its attachments and return the resolved view.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        input: SendMessage,
    ) -> AppResult<MessageView> {
        let conversation = self.member_conversation(ctx, input.conversation_id).await?;

        let content = normalize_content(input.content.as_deref())?;
        let media_ids = normalize_media_ids(&input.media_ids)?;
        if content.is_none() && media_ids.is_empty() {
            return Err(AppError::validation(
                "A message needs content or at least one attachment",
            ));
        }

        let kind = if media_ids.is_empty() {
            MessageKind::Text
        } else {
            let media = self.store.find_media(&media_ids).await?;
            if media.len() != media_ids.len() {
                return Err(AppError::validation("Unknown media id"));
            }
            MessageKind::from_attachments(media.iter().map(|m| m.content_type.as_str()))
        };

        if let Some(reply_to) = input.reply_to {
            let target = self.store.find_message(reply_to).await?;
            if target.is_none_or(|t| t.conversation_id != conversation.id) {
                return Err(AppError::not_found("Reply target not found"));
            }
        }

        let message = self
            .store
            .create_message(&NewMessage {
                conversation_id: conversation.id,
                sender_id: ctx.user_id,
                sender_role: ctx.role,
                kind,
                content,
                reply_to: input.reply_to,
            })
            .await?;

        if !media_ids.is_empty() {
            self.store.link_attachments(message.id, &media_ids).await?;
        }

        info!(
            conversation_id = %conversation.id,
            message_id = %message.id,
            sender_id = %ctx.user_id,
            attachments = media_ids.len(),
            "Message sent"
        );

        self.assembler.one(message).await
    }

    /// Edit the caller's own message.
    ///
    /// Returns `None` when the caller is not the sender or the message is
    /// deleted; nothing changes in that case.
    pub async fn edit_message(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
        content: &str,
    ) -> AppResult<Option<MessageEdit>> {
        let content = required_content(content)?;

        match self
            .store
            .update_message_content(message_id, ctx.user_id, &content)
            .await?
        {
            Some(message) => Ok(Some(MessageEdit {
                conversation_id: message.conversation_id,
                message_id: message.id,
                content,
                edited_at: message.edited_at.unwrap_or(ctx.request_time),
            })),
            None => {
                self.require_message(message_id).await?;
                Ok(None)
            }
        }
    }

    /// Soft-delete the caller's own message, returning the suppressed view.
    pub async fn delete_message(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
    ) -> AppResult<Option<MessageView>> {
        match self
            .store
            .soft_delete_message(message_id, ctx.user_id)
            .await?
        {
            Some(message) => {
                info!(message_id = %message.id, sender_id = %ctx.user_id, "Message deleted");
                self.assembler.one(message).await.map(Some)
            }
            None => {
                self.require_message(message_id).await?;
                Ok(None)
            }
        }
    }

    /// Detach one media object from the caller's own message.
    ///
    /// The stored object is deleted once no message links it anymore.
    pub async fn remove_attachment(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
        media_id: MediaId,
    ) -> AppResult<Option<MessageView>> {
        let outcome = self
            .store
            .unlink_attachment(message_id, ctx.user_id, media_id)
            .await?;
        if !outcome.removed {
            // The store filters on ownership; only a missing link on the
            // caller's own live message is reported.
            let message = self.require_message(message_id).await?;
            if message.sender_id != ctx.user_id || message.is_deleted() {
                return Ok(None);
            }
            return Err(AppError::not_found("Attachment not found"));
        }

        if let Some(orphan) = outcome.orphaned {
            if let Err(e) = self.storage.delete(&orphan.object_key).await {
                warn!(error = %e, object_key = %orphan.object_key, "Failed to delete orphaned media object");
            }
            if let Err(e) = self.urls.invalidate(&orphan.object_key).await {
                warn!(error = %e, object_key = %orphan.object_key, "Failed to invalidate signed URL");
            }
        }

        let links = self.store.list_attachments(&[message_id]).await?;
        let remaining: Vec<MediaId> = links.iter().map(|l| l.media_id).collect();
        let media = if remaining.is_empty() {
            Vec::new()
        } else {
            self.store.find_media(&remaining).await?
        };
        let kind = MessageKind::from_attachments(media.iter().map(|m| m.content_type.as_str()));
        let mut updated = self.require_message(message_id).await?;
        if kind != updated.kind {
            self.store.set_message_kind(message_id, kind).await?;
            updated = self.require_message(message_id).await?;
        }
        self.assembler.one(updated).await.map(Some)
    }

    // -- Reactions ------------------------------------------------------

    /// Add a reaction. Returns `None` if the caller already reacted with
    /// that emoji.
    pub async fn react(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
        emoji: &str,
    ) -> AppResult<Option<ReactionDelta>> {
        let emoji = normalize_emoji(emoji)?;
        let message = self.require_message(message_id).await?;
        let added = self
            .store
            .add_reaction(message_id, ctx.user_id, &emoji)
            .await?;
        Ok(added.then(|| ReactionDelta {
            conversation_id: message.conversation_id,
            message_id,
            user_id: ctx.user_id,
            emoji,
        }))
    }

    /// Remove a reaction. Returns `None` if there was nothing to remove.
    pub async fn unreact(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
        emoji: &str,
    ) -> AppResult<Option<ReactionDelta>> {
        let emoji = normalize_emoji(emoji)?;
        let message = self.require_message(message_id).await?;
        let removed = self
            .store
            .remove_reaction(message_id, ctx.user_id, &emoji)
            .await?;
        Ok(removed.then(|| ReactionDelta {
            conversation_id: message.conversation_id,
            message_id,
            user_id: ctx.user_id,
            emoji,
        }))
    }

    // -- Read markers ---------------------------------------------------

    /// Record that the caller has read up to `message_id`.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> AppResult<ReadMarker> {
        let message = self.require_message(message_id).await?;
        if message.conversation_id != conversation_id {
            return Err(AppError::not_found("Message not found"));
        }
        self.store
            .upsert_read_marker(conversation_id, ctx.user_id, message_id)
            .await
    }

    /// Every member's read marker.
    pub async fn read_markers(&self, conversation_id: ConversationId) -> AppResult<Vec<ReadMarker>> {
        self.store.list_read_markers(conversation_id).await
    }

    // -- Pins -----------------------------------------------------------

    /// Pin a message. Pinning twice returns the original pin.
    pub async fn pin(&self, ctx: &RequestContext, message_id: MessageId) -> AppResult<Pin> {
        let message = self.require_message(message_id).await?;
        self.store
            .pin_message(message.conversation_id, message_id, ctx.user_id)
            .await
    }

    /// Unpin a message. Unpinning a message that is not pinned succeeds.
    pub async fn unpin(&self, message_id: MessageId) -> AppResult<ConversationId> {
        let message = self.require_message(message_id).await?;
        self.store
            .unpin_message(message.conversation_id, message_id)
            .await?;
        Ok(message.conversation_id)
    }

    /// Pins of a conversation, oldest first.
    pub async fn pins(&self, conversation_id: ConversationId) -> AppResult<Vec<Pin>> {
        self.store.list_pins(conversation_id).await
    }

    async fn require_message(&self, message_id: MessageId) -> AppResult<Message> {
        self.store
            .find_message(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))
    }
}

fn ensure_member(ctx: &RequestContext, conversation: &Conversation) -> AppResult<()> {
    if ctx.is_admin() || conversation.has_member(&ctx.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not a member of this conversation"))
    }
}
