//! # classhub-service
//!
//! Business logic behind ClassHub's realtime surface:
//!
//! - [`conversation`]: message lifecycle, batched page assembly, reactions,
//!   read markers, pins, and roster sync over the conversation store.
//! - [`live`]: live-room lifecycle and the TTL-backed teacher presence
//!   signal.

pub mod context;
pub mod conversation;
pub mod live;

#[cfg(test)]
mod test_support;

pub use context::RequestContext;
pub use conversation::ConversationService;
pub use live::LiveRoomManager;
