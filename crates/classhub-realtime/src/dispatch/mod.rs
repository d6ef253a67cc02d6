//! Event dispatch onto the service layer.

mod conversation;
mod live;

use std::sync::Arc;

use crate::connection::handle::ConnectionHandle;
use crate::message::error::EventError;
use crate::message::types::ClientEvent;
use crate::server::RealtimeEngine;

impl RealtimeEngine {
    /// Route one parsed event.
    pub(crate) async fn dispatch(
        &self,
        handle: &Arc<ConnectionHandle>,
        event: ClientEvent,
    ) -> Result<(), EventError> {
        match event {
            ClientEvent::Pong { .. } => {
                handle.record_pong().await;
                Ok(())
            }
            ClientEvent::CreateOrJoinRoom { .. }
            | ClientEvent::JoinRoom { .. }
            | ClientEvent::LeaveRoom { .. }
            | ClientEvent::PingRoom { .. }
            | ClientEvent::GetClassLiveStatus { .. } => self.dispatch_live(handle, event).await,
            _ => self.dispatch_conversation(handle, event).await,
        }
    }
}
