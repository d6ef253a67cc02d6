//! Live video rooms and teacher presence.

pub mod manager;

pub use manager::{LiveRoomManager, RoomJoin};
