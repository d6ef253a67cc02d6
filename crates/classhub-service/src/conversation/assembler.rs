//! Batched assembly of message views.
//!
//! A page of N messages costs a fixed number of store round trips: one for
//! attachment links, one for media rows, one for reactions, one for reply
//! targets and one for user profiles. Signed URLs come from the URL cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::types::{MediaId, MessageId, UserId};
use classhub_database::ChatStore;
use classhub_entity::media::MediaObject;
use classhub_entity::message::Message;
use classhub_entity::reaction::{Reaction, ReactionSummary};
use classhub_entity::user::{UserProfile, UserRole};
use classhub_storage::SignedUrlCache;

use super::view::{AttachmentView, MessageView, ReplyPreview, UserView};

/// Turns stored messages into client views.
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    store: Arc<dyn ChatStore>,
    urls: SignedUrlCache,
}

impl MessageAssembler {
    /// Creates a new assembler.
    pub fn new(store: Arc<dyn ChatStore>, urls: SignedUrlCache) -> Self {
        Self { store, urls }
    }

    /// Resolve user profiles into views with signed avatar URLs.
    ///
    /// Ids without a directory entry are skipped.
    pub async fn users(&self, ids: &[UserId]) -> AppResult<Vec<UserView>> {
        let profiles = self.store.find_users(ids).await?;
        let by_id: HashMap<UserId, UserProfile> =
            profiles.into_iter().map(|p| (p.id, p)).collect();

        let mut views = Vec::with_capacity(by_id.len());
        for id in ids {
            if let Some(profile) = by_id.get(id) {
                views.push(self.user_view(profile).await?);
            }
        }
        Ok(views)
    }

    /// Assemble one message.
    pub async fn one(&self, message: Message) -> AppResult<MessageView> {
        let mut views = self.many(vec![message]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::internal("Message assembly produced no view"))
    }

    /// Assemble a batch of messages, preserving input order.
    pub async fn many(&self, messages: Vec<Message>) -> AppResult<Vec<MessageView>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();

        // Attachments of deleted messages are never served.
        let live_ids: Vec<MessageId> = messages
            .iter()
            .filter(|m| !m.is_deleted())
            .map(|m| m.id)
            .collect();
        let links = if live_ids.is_empty() {
            Vec::new()
        } else {
            self.store.list_attachments(&live_ids).await?
        };
        let media_ids: Vec<MediaId> = unique(links.iter().map(|l| l.media_id));
        let media: HashMap<MediaId, MediaObject> = if media_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_media(&media_ids)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };

        let reactions = self.store.list_reactions(&ids).await?;
        let mut reactions_by_message: HashMap<MessageId, Vec<Reaction>> = HashMap::new();
        for reaction in reactions {
            reactions_by_message
                .entry(reaction.message_id)
                .or_default()
                .push(reaction);
        }

        let reply_ids: Vec<MessageId> = unique(messages.iter().filter_map(|m| m.reply_to));
        let replies: HashMap<MessageId, Message> = if reply_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_messages(&reply_ids)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };

        let user_ids: Vec<UserId> = unique(
            messages
                .iter()
                .map(|m| m.sender_id)
                .chain(replies.values().map(|m| m.sender_id)),
        );
        let profiles: HashMap<UserId, UserProfile> = self
            .store
            .find_users(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut senders: HashMap<UserId, UserView> = HashMap::with_capacity(profiles.len());
        for profile in profiles.values() {
            senders.insert(profile.id, self.user_view(profile).await?);
        }

        let mut attachments: HashMap<MessageId, Vec<AttachmentView>> = HashMap::new();
        for link in &links {
            let Some(object) = media.get(&link.media_id) else {
                continue;
            };
            let view = AttachmentView {
                media_id: object.id,
                file_name: object.file_name.clone(),
                content_type: object.content_type.clone(),
                size_bytes: object.size_bytes,
                url: self.urls.get_url(&object.object_key).await?,
            };
            attachments.entry(link.message_id).or_default().push(view);
        }

        let views = messages
            .into_iter()
            .map(|message| {
                let sender = senders
                    .get(&message.sender_id)
                    .cloned()
                    .unwrap_or_else(|| unknown_user(message.sender_id, message.sender_role));
                let reply_to = message
                    .reply_to
                    .map(|id| reply_preview(id, replies.get(&id), &profiles));
                let reactions = reactions_by_message
                    .get(&message.id)
                    .map(|r| ReactionSummary::aggregate(r))
                    .unwrap_or_default();
                let attachments = if message.is_deleted() {
                    Vec::new()
                } else {
                    attachments.remove(&message.id).unwrap_or_default()
                };

                MessageView {
                    id: message.id,
                    conversation_id: message.conversation_id,
                    sender,
                    kind: message.effective_kind(),
                    content: message.state.content().map(str::to_string),
                    reply_to,
                    attachments,
                    reactions,
                    created_at: message.created_at,
                    edited_at: message.edited_at,
                    deleted_at: message.state.deleted_at(),
                }
            })
            .collect();

        Ok(views)
    }

    async fn user_view(&self, profile: &UserProfile) -> AppResult<UserView> {
        Ok(UserView {
            id: profile.id,
            display_name: profile.display_name.clone(),
            role: profile.role,
            avatar_url: self.urls.get_optional(profile.avatar_key.as_deref()).await?,
        })
    }
}

fn reply_preview(
    id: MessageId,
    target: Option<&Message>,
    profiles: &HashMap<UserId, UserProfile>,
) -> ReplyPreview {
    match target {
        Some(target) if !target.is_deleted() => ReplyPreview {
            id,
            deleted: false,
            sender_id: Some(target.sender_id),
            sender_name: profiles
                .get(&target.sender_id)
                .map(|p| p.display_name.clone()),
            kind: Some(target.effective_kind()),
            content: target.state.content().map(str::to_string),
        },
        _ => ReplyPreview::deleted(id),
    }
}

fn unknown_user(id: UserId, role: UserRole) -> UserView {
    UserView {
        id,
        display_name: String::new(),
        role,
        avatar_url: None,
    }
}

fn unique<T: Copy + Eq + std::hash::Hash>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
