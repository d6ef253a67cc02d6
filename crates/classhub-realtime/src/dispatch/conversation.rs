//! Conversation events.
//!
//! Everything except `join_conversation` requires the connection to be in
//! the conversation's group. Message-scoped events resolve the message's
//! conversation first and check the group before mutating anything.

use std::sync::Arc;

use tracing::debug;

use classhub_core::types::{ConversationId, MessageId};
use classhub_service::conversation::SendMessage;

use crate::channel::registry::conversation_group;
use crate::connection::handle::ConnectionHandle;
use crate::message::error::EventError;
use crate::message::types::{ClientEvent, ServerEvent};
use crate::server::RealtimeEngine;

impl RealtimeEngine {
    pub(super) async fn dispatch_conversation(
        &self,
        handle: &Arc<ConnectionHandle>,
        event: ClientEvent,
    ) -> Result<(), EventError> {
        let ctx = &handle.ctx;
        match event {
            ClientEvent::JoinConversation { class_id } => {
                let joined = self.conversations.join(ctx, class_id).await?;
                let group = conversation_group(joined.conversation_id);
                if self.groups.join(&group, handle) {
                    debug!(conn_id = %handle.id, conversation_id = %joined.conversation_id, "Joined conversation group");
                }
                self.send(handle, &ServerEvent::ConversationJoined(joined));
            }
            ClientEvent::LeaveConversation { conversation_id } => {
                let group = self.joined_group(handle, conversation_id)?;
                self.groups.leave(&group, handle.id);
                self.send(handle, &ServerEvent::ConversationLeft { conversation_id });
            }
            ClientEvent::LoadMessages {
                conversation_id,
                before,
            } => {
                self.joined_group(handle, conversation_id)?;
                let page = self
                    .conversations
                    .load_messages(conversation_id, before)
                    .await?;
                self.send(
                    handle,
                    &ServerEvent::MessagesLoaded {
                        conversation_id,
                        messages: page.items,
                        has_more: page.has_more,
                    },
                );
            }
            ClientEvent::SendMessage {
                conversation_id,
                content,
                reply_to,
                media_ids,
            } => {
                let group = self.joined_group(handle, conversation_id)?;
                let message = self
                    .conversations
                    .send_message(
                        ctx,
                        SendMessage {
                            conversation_id,
                            content,
                            reply_to,
                            media_ids,
                        },
                    )
                    .await?;
                self.broadcast(&group, &ServerEvent::NewMessage { message }, |_| true);
            }
            ClientEvent::EditMessage {
                message_id,
                content,
            } => {
                let group = self.message_group(handle, message_id).await?;
                if let Some(edit) = self
                    .conversations
                    .edit_message(ctx, message_id, &content)
                    .await?
                {
                    self.broadcast(&group, &ServerEvent::MessageEdited(edit), |_| true);
                }
            }
            ClientEvent::DeleteMessage { message_id } => {
                let group = self.message_group(handle, message_id).await?;
                if let Some(message) = self.conversations.delete_message(ctx, message_id).await? {
                    self.broadcast(&group, &ServerEvent::MessageDeleted { message }, |_| true);
                }
            }
            ClientEvent::ReactMessage { message_id, emoji } => {
                let group = self.message_group(handle, message_id).await?;
                if let Some(delta) = self.conversations.react(ctx, message_id, &emoji).await? {
                    self.broadcast(&group, &ServerEvent::ReactionAdded(delta), |_| true);
                }
            }
            ClientEvent::RemoveReaction { message_id, emoji } => {
                let group = self.message_group(handle, message_id).await?;
                if let Some(delta) = self.conversations.unreact(ctx, message_id, &emoji).await? {
                    self.broadcast(&group, &ServerEvent::ReactionRemoved(delta), |_| true);
                }
            }
            ClientEvent::MarkRead {
                conversation_id,
                message_id,
            } => {
                let group = self.joined_group(handle, conversation_id)?;
                let marker = self
                    .conversations
                    .mark_read(ctx, conversation_id, message_id)
                    .await?;
                let reader = ctx.user_id;
                self.broadcast(&group, &ServerEvent::MessageRead(marker), |h| {
                    h.user_id() != reader
                });
            }
            ClientEvent::PinMessage { message_id } => {
                let group = self.message_group(handle, message_id).await?;
                let pin = self.conversations.pin(ctx, message_id).await?;
                self.broadcast(&group, &ServerEvent::MessagePinned(pin), |_| true);
            }
            ClientEvent::UnpinMessage { message_id } => {
                let group = self.message_group(handle, message_id).await?;
                let conversation_id = self.conversations.unpin(message_id).await?;
                self.broadcast(
                    &group,
                    &ServerEvent::MessageUnpinned {
                        conversation_id,
                        message_id,
                    },
                    |_| true,
                );
            }
            ClientEvent::ListPins { conversation_id } => {
                self.joined_group(handle, conversation_id)?;
                let pins = self.conversations.pins(conversation_id).await?;
                self.send(
                    handle,
                    &ServerEvent::Pins {
                        conversation_id,
                        pins,
                    },
                );
            }
            ClientEvent::LoadReadMarkers { conversation_id } => {
                self.joined_group(handle, conversation_id)?;
                let markers = self.conversations.read_markers(conversation_id).await?;
                self.send(
                    handle,
                    &ServerEvent::ReadMarkers {
                        conversation_id,
                        markers,
                    },
                );
            }
            ClientEvent::RemoveAttachment {
                message_id,
                media_id,
            } => {
                let group = self.message_group(handle, message_id).await?;
                if let Some(message) = self
                    .conversations
                    .remove_attachment(ctx, message_id, media_id)
                    .await?
                {
                    self.broadcast(&group, &ServerEvent::MessageUpdated { message }, |_| true);
                }
            }
            other => {
                return Err(EventError::invalid(format!(
                    "Unsupported conversation event: {}",
                    other.name()
                )));
            }
        }
        Ok(())
    }

    /// Group name of a conversation this connection has joined.
    fn joined_group(
        &self,
        handle: &ConnectionHandle,
        conversation_id: ConversationId,
    ) -> Result<String, EventError> {
        let group = conversation_group(conversation_id);
        if self.groups.is_member(&group, handle.id) {
            Ok(group)
        } else {
            Err(EventError::not_joined())
        }
    }

    /// Group of the conversation a message belongs to, if joined.
    async fn message_group(
        &self,
        handle: &ConnectionHandle,
        message_id: MessageId,
    ) -> Result<String, EventError> {
        let conversation_id = self.conversations.conversation_of(message_id).await?;
        self.joined_group(handle, conversation_id)
    }
}
