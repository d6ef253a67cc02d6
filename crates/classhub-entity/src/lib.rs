//! # classhub-entity
//!
//! Domain entity models for ClassHub conversations and live rooms. Structs
//! that map to a table row derive `sqlx::FromRow`; the rest are value
//! objects assembled from those rows.

pub mod class;
pub mod conversation;
pub mod live_room;
pub mod media;
pub mod message;
pub mod pin;
pub mod reaction;
pub mod read_marker;
pub mod user;
