//! Stored media objects and their links to messages.

pub mod attachment;
pub mod model;

pub use attachment::AttachmentLink;
pub use model::MediaObject;
