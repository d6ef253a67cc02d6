//! Broadcast groups keyed by conversation.

pub mod registry;
