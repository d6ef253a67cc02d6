//! Live room events. Replies go to the initiating connection only.

use std::sync::Arc;

use crate::connection::handle::ConnectionHandle;
use crate::message::error::EventError;
use crate::message::types::{ClientEvent, ServerEvent};
use crate::server::RealtimeEngine;

impl RealtimeEngine {
    pub(super) async fn dispatch_live(
        &self,
        handle: &Arc<ConnectionHandle>,
        event: ClientEvent,
    ) -> Result<(), EventError> {
        let ctx = &handle.ctx;
        match event {
            ClientEvent::CreateOrJoinRoom {
                class_id,
                room_name,
            } => {
                let joined = self.live.create_or_join(ctx, class_id, &room_name).await?;
                self.send(handle, &ServerEvent::RoomJoined(joined));
            }
            ClientEvent::JoinRoom { room_id } => {
                let joined = self.live.join(ctx, room_id).await?;
                self.send(handle, &ServerEvent::RoomJoined(joined));
            }
            ClientEvent::LeaveRoom { room_id } => {
                self.live.leave(ctx, room_id).await?;
                self.send(handle, &ServerEvent::RoomLeft { room_id });
            }
            ClientEvent::PingRoom { room_id } => {
                self.live.ping(ctx, room_id).await?;
            }
            ClientEvent::GetClassLiveStatus { class_id } => {
                let status = self.live.live_status(ctx, class_id).await?;
                self.send(handle, &ServerEvent::LiveStatus { class_id, status });
            }
            other => {
                return Err(EventError::invalid(format!(
                    "Unsupported live event: {}",
                    other.name()
                )));
            }
        }
        Ok(())
    }
}
