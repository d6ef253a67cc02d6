//! Conversation entity.

pub mod model;

pub use model::Conversation;
