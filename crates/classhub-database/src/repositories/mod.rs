//! Concrete PostgreSQL repositories, one per entity.

pub mod conversation;
pub mod live_room;
pub mod media;
pub mod message;
pub mod pin;
pub mod reaction;
pub mod read_marker;
pub mod user;

pub use conversation::ConversationRepository;
pub use live_room::LiveRoomRepository;
pub use media::MediaRepository;
pub use message::MessageRepository;
pub use pin::PinRepository;
pub use reaction::ReactionRepository;
pub use read_marker::ReadMarkerRepository;
pub use user::UserRepository;
