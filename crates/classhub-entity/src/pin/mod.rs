//! Pinned messages.

pub mod model;

pub use model::Pin;
